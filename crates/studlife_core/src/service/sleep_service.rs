//! Sleep feature state manager.
//!
//! # Responsibility
//! - Merge settings patches.
//! - Record nights with replace-by-date semantics over a 7-day window.
//!
//! # Invariants
//! - History stays canonical, sorted by real date, and bounded after every
//!   `add_entry`, including for legacy rows loaded from storage.

use crate::model::schema::PartitionRecord;
use crate::model::sleep::{NewSleepEntry, SleepSettingsPatch, SleepState};
use crate::service::partition::{LoadPhase, LoadSource, PartitionManager};
use crate::service::stats::{weekly_sleep, WeeklySleepStats};
use crate::service::ServiceResult;
use crate::store::{PartitionStore, RetryPolicy};
use log::debug;
use std::sync::Arc;

pub struct SleepManager {
    inner: PartitionManager<SleepState>,
}

impl SleepManager {
    pub fn new(store: Arc<dyn PartitionStore>, retry: Arc<dyn RetryPolicy>) -> ServiceResult<Self> {
        Ok(Self {
            inner: PartitionManager::new(store, retry)?,
        })
    }

    pub fn load(&mut self) -> LoadSource {
        self.inner.load()
    }

    pub fn phase(&self) -> LoadPhase {
        self.inner.phase()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    pub fn state(&self) -> Option<&SleepState> {
        self.inner.state()
    }

    /// Shallow-merges `patch` into the settings.
    pub fn update_settings(&mut self, patch: &SleepSettingsPatch) -> ServiceResult<()> {
        patch.validate()?;
        self.inner.mutate(|state| {
            if patch.is_empty() {
                return Ok((false, ()));
            }
            patch.apply_to(&mut state.settings);
            Ok((true, ()))
        })
    }

    /// Records one night; an existing entry for the same day is replaced.
    pub fn add_entry(&mut self, entry: NewSleepEntry) -> ServiceResult<()> {
        entry.validate()?;
        self.inner.mutate(|state| {
            state.insert_entry(entry.into_entry());
            debug!(
                "event=sleep_add_entry module=service status=ok partition={} history_len={}",
                SleepState::PARTITION,
                state.history.len()
            );
            Ok((true, ()))
        })
    }

    /// Weekly average over the loaded history; `None` while loading or empty.
    pub fn weekly_stats(&self) -> Option<WeeklySleepStats> {
        self.state().and_then(weekly_sleep)
    }

    pub fn flush(&self) {
        self.inner.flush();
    }

    pub(crate) fn shutdown(&mut self) {
        self.inner.shutdown();
    }
}
