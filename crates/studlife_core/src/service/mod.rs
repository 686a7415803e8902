//! Feature state managers and read-only derived views.
//!
//! # Responsibility
//! - Own one partition record per feature and expose its mutations.
//! - Enforce free-tier limits inside the managers, not at call sites.
//! - Compute statistics and job queries over snapshots.
//!
//! # Invariants
//! - Managers never bypass model validation before committing a change.
//! - No operation touches more than one partition.

use crate::model::ValidationError;
use crate::store::{Partition, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod job_query;
pub mod jobs_service;
pub mod partition;
pub mod payments_service;
pub mod savings_service;
pub mod sleep_service;
pub mod stats;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    /// Partition has not finished its initial load.
    NotReady(Partition),
    /// Input rejected before any record was built or changed.
    Validation(ValidationError),
    /// Free-tier cap reached; the caller should show the upgrade path.
    LimitExceeded {
        partition: Partition,
        limit: usize,
        current: usize,
    },
    /// Record id already present in the partition.
    DuplicateId { partition: Partition, id: String },
    /// Store-level failure while wiring a manager.
    Store(StoreError),
}

impl ServiceError {
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self, Self::LimitExceeded { .. })
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady(partition) => write!(f, "partition `{partition}` is still loading"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::LimitExceeded {
                partition,
                limit,
                current,
            } => write!(
                f,
                "`{partition}` limit reached: {current} of {limit} allowed"
            ),
            Self::DuplicateId { partition, id } => {
                write!(f, "`{partition}` already contains id `{id}`")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
