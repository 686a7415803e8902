//! Core configuration.
//!
//! # Responsibility
//! - Describe where the store lives, the free-tier limits, and the write
//!   retry policy.
//! - Parse partial JSON documents, filling defaults for absent fields.

use crate::store::{FixedRetry, NoRetry, RetryPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Free-tier cap on savings goals.
pub const FREE_TIER_MAX_GOALS: usize = 10;
/// Free-tier cap on unpaid reminders.
pub const FREE_TIER_MAX_ACTIVE_REMINDERS: usize = 10;
/// Default database file name inside the app data directory.
pub const DB_FILE_NAME: &str = "studlife.sqlite3";

/// Policy caps enforced by the savings and payments managers.
///
/// `None` disables a cap (premium tier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeatureLimits {
    pub max_goals: Option<usize>,
    pub max_active_reminders: Option<usize>,
}

impl Default for FeatureLimits {
    fn default() -> Self {
        Self {
            max_goals: Some(FREE_TIER_MAX_GOALS),
            max_active_reminders: Some(FREE_TIER_MAX_ACTIVE_REMINDERS),
        }
    }
}

impl FeatureLimits {
    pub fn unlimited() -> Self {
        Self {
            max_goals: None,
            max_active_reminders: None,
        }
    }
}

/// Write retry settings; `max_attempts <= 1` means no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicyConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            delay_ms: 0,
        }
    }
}

impl RetryPolicyConfig {
    pub fn build(&self) -> Arc<dyn RetryPolicy> {
        if self.max_attempts <= 1 {
            return Arc::new(NoRetry);
        }
        Arc::new(FixedRetry {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.delay_ms),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    #[serde(default)]
    pub limits: FeatureLimits,
    #[serde(default)]
    pub write_retry: RetryPolicyConfig,
}

impl CoreConfig {
    pub fn for_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            limits: FeatureLimits::default(),
            write_retry: RetryPolicyConfig::default(),
        }
    }

    /// Uses [`DB_FILE_NAME`] inside `data_dir`.
    pub fn for_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::for_db_path(data_dir.as_ref().join(DB_FILE_NAME))
    }

    /// Parses a JSON document; only `db_path` is required.
    pub fn from_json_str(value: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(value)
    }
}
