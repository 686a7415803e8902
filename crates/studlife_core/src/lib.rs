//! Core domain logic for StudLife.
//! This crate is the single source of truth for persistence and
//! state-reconciliation invariants; the UI only renders and forwards input.

pub mod app;
pub mod config;
pub mod date;
pub mod db;
pub mod logging;
pub mod model;
pub mod seed;
pub mod service;
pub mod store;

pub use app::AppCore;
pub use config::{CoreConfig, FeatureLimits, RetryPolicyConfig};
pub use date::{normalize_to_canonical, parse_date, sort_key, CalendarDate};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::jobs::{EmploymentType, Job, JobsState};
pub use model::payments::{
    PaymentReminder, PaymentReminderPatch, PaymentsState, ReminderUrgency, RepeatRule,
};
pub use model::savings::{SavingsGoal, SavingsGoalPatch, SavingsState};
pub use model::sleep::{NewSleepEntry, SleepEntry, SleepSettings, SleepSettingsPatch, SleepState};
pub use model::ValidationError;
pub use service::job_query::{filter_jobs, posted_recency, JobQuery, JobSort, PostedRecency};
pub use service::partition::{LoadPhase, LoadSource};
pub use service::stats::{DashboardSummary, ReminderSummary, SavingsSummary, WeeklySleepStats};
pub use service::{ServiceError, ServiceResult};
pub use store::{Partition, PartitionStore, Store, StoreError, StoredBlob, MAIN_RECORD_ID};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
