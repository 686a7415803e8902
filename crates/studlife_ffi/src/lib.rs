//! Flutter-facing bindings over `studlife_core`.

pub mod api;
