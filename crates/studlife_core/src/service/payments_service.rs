//! Payments feature state manager.
//!
//! # Invariants
//! - The reminder cap counts active (unpaid) reminders only and is
//!   recomputed from current state on every add.
//! - Adding an already-paid reminder is never capped.
//! - Paying a repeating reminder does not create its next occurrence.

use crate::model::payments::{PaymentReminder, PaymentReminderPatch, PaymentsState};
use crate::service::partition::{LoadPhase, LoadSource, PartitionManager};
use crate::service::stats::{reminder_summary, ReminderSummary};
use crate::service::{ServiceError, ServiceResult};
use crate::store::{Partition, PartitionStore, RetryPolicy};
use log::info;
use std::sync::Arc;

pub struct PaymentsManager {
    inner: PartitionManager<PaymentsState>,
    max_active: Option<usize>,
}

impl PaymentsManager {
    pub fn new(
        store: Arc<dyn PartitionStore>,
        retry: Arc<dyn RetryPolicy>,
        max_active: Option<usize>,
    ) -> ServiceResult<Self> {
        Ok(Self {
            inner: PartitionManager::new(store, retry)?,
            max_active,
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

    pub fn state(&self) -> Option<&PaymentsState> {
        self.inner.state()
    }

    pub fn max_active(&self) -> Option<usize> {
        self.max_active
    }

    pub fn active_count(&self) -> usize {
        self.state().map_or(0, PaymentsState::active_count)
    }

    pub fn add_reminder(&mut self, reminder: PaymentReminder) -> ServiceResult<()> {
        reminder.validate()?;
        let max_active = self.max_active;
        self.inner.mutate(|state| {
            let active = state.active_count();
            if let Some(limit) = max_active.filter(|_| reminder.is_active()) {
                if active >= limit {
                    info!(
                        "event=payments_add_reminder module=service status=skipped reason=limit_reached limit={}",
                        limit
                    );
                    return Err(ServiceError::LimitExceeded {
                        partition: Partition::Payments,
                        limit,
                        current: active,
                    });
                }
            }
            if state.reminder(&reminder.id).is_some() {
                return Err(ServiceError::DuplicateId {
                    partition: Partition::Payments,
                    id: reminder.id.clone(),
                });
            }
            state.reminders.push(reminder);
            Ok((true, ()))
        })
    }

    /// Returns `false` when no reminder has `id`.
    pub fn update_reminder(&mut self, id: &str, patch: &PaymentReminderPatch) -> ServiceResult<bool> {
        patch.validate()?;
        self.inner.mutate(|state| {
            let Some(reminder) = state.reminders.iter_mut().find(|reminder| reminder.id == id) else {
                return Ok((false, false));
            };
            patch.apply_to(reminder);
            Ok((true, true))
        })
    }

    pub fn mark_paid(&mut self, id: &str) -> ServiceResult<bool> {
        self.update_reminder(id, &PaymentReminderPatch::paid())
    }

    /// Returns `false` when no reminder has `id`.
    pub fn remove_reminder(&mut self, id: &str) -> ServiceResult<bool> {
        self.inner.mutate(|state| {
            let before = state.reminders.len();
            state.reminders.retain(|reminder| reminder.id != id);
            let removed = state.reminders.len() != before;
            Ok((removed, removed))
        })
    }

    pub fn summary(&self) -> Option<ReminderSummary> {
        self.state().map(|state| reminder_summary(&state.reminders))
    }

    pub fn flush(&self) {
        self.inner.flush();
    }

    pub(crate) fn shutdown(&mut self) {
        self.inner.shutdown();
    }
}
