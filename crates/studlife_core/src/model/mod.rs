//! Record shapes for the four partitions plus patch and validation types.
//!
//! # Responsibility
//! - Define the serialized shape of every partition blob (camelCase fields).
//! - Validate user input before any record is constructed or changed.
//! - Own blob schema versions and the upgrade path between them.
//!
//! # Invariants
//! - A record that failed validation is never handed to a manager.
//! - Ids are opaque strings, unique within their partition.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod jobs;
pub mod payments;
pub mod savings;
pub mod schema;
pub mod sleep;

/// Input rejected at the mutation boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text field is blank after trim.
    EmptyField(&'static str),
    /// Numeric field is NaN or infinite.
    NotFinite(&'static str),
    /// Numeric field must be `>= 0`.
    Negative { field: &'static str, value: f64 },
    /// Numeric field must be `> 0`.
    NotPositive { field: &'static str, value: f64 },
    /// Field is not a `HH:MM` clock time.
    InvalidTime { field: &'static str, value: String },
    /// Field is not an accepted calendar date.
    InvalidDate { field: &'static str, value: String },
    /// Lower bound exceeds upper bound.
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} must not be blank"),
            Self::NotFinite(field) => write!(f, "{field} must be a finite number"),
            Self::Negative { field, value } => write!(f, "{field} must be >= 0, got {value}"),
            Self::NotPositive { field, value } => write!(f, "{field} must be > 0, got {value}"),
            Self::InvalidTime { field, value } => {
                write!(f, "{field} must be a HH:MM time, got `{value}`")
            }
            Self::InvalidDate { field, value } => {
                write!(f, "{field} must be DD.MM.YYYY or YYYY-MM-DD, got `{value}`")
            }
            Self::InvalidRange { field, min, max } => {
                write!(f, "{field} range is inverted: {min} > {max}")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(())
}

pub(crate) fn require_date(field: &'static str, value: &str) -> Result<(), ValidationError> {
    require_text(field, value)?;
    if crate::date::parse_date(value).is_none() {
        return Err(ValidationError::InvalidDate {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Generates a fresh opaque record id.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
