//! Savings feature state manager.
//!
//! # Invariants
//! - `add_goal` re-checks the goal cap against current state right before
//!   committing and fails with `ServiceError::LimitExceeded`.
//! - `update_goal`/`remove_goal` on an unknown id are no-ops returning `false`.

use crate::model::savings::{SavingsGoal, SavingsGoalPatch, SavingsState};
use crate::service::partition::{LoadPhase, LoadSource, PartitionManager};
use crate::service::stats::{savings_summary, SavingsSummary};
use crate::service::{ServiceError, ServiceResult};
use crate::store::{Partition, PartitionStore, RetryPolicy};
use log::info;
use std::sync::Arc;

pub struct SavingsManager {
    inner: PartitionManager<SavingsState>,
    max_goals: Option<usize>,
}

impl SavingsManager {
    pub fn new(
        store: Arc<dyn PartitionStore>,
        retry: Arc<dyn RetryPolicy>,
        max_goals: Option<usize>,
    ) -> ServiceResult<Self> {
        Ok(Self {
            inner: PartitionManager::new(store, retry)?,
            max_goals,
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

    pub fn state(&self) -> Option<&SavingsState> {
        self.inner.state()
    }

    pub fn max_goals(&self) -> Option<usize> {
        self.max_goals
    }

    /// `true` when another goal may be added under the current cap.
    pub fn can_add_goal(&self) -> bool {
        match (self.max_goals, self.state()) {
            (Some(limit), Some(state)) => state.goals.len() < limit,
            (None, Some(_)) => true,
            (_, None) => false,
        }
    }

    pub fn add_goal(&mut self, goal: SavingsGoal) -> ServiceResult<()> {
        goal.validate()?;
        let max_goals = self.max_goals;
        self.inner.mutate(|state| {
            if let Some(limit) = max_goals {
                if state.goals.len() >= limit {
                    info!(
                        "event=savings_add_goal module=service status=skipped reason=limit_reached limit={}",
                        limit
                    );
                    return Err(ServiceError::LimitExceeded {
                        partition: Partition::Savings,
                        limit,
                        current: state.goals.len(),
                    });
                }
            }
            if state.goal(&goal.id).is_some() {
                return Err(ServiceError::DuplicateId {
                    partition: Partition::Savings,
                    id: goal.id.clone(),
                });
            }
            state.goals.push(goal);
            Ok((true, ()))
        })
    }

    /// Returns `false` when no goal has `id`.
    pub fn update_goal(&mut self, id: &str, patch: &SavingsGoalPatch) -> ServiceResult<bool> {
        patch.validate()?;
        self.inner.mutate(|state| {
            let Some(goal) = state.goals.iter_mut().find(|goal| goal.id == id) else {
                return Ok((false, false));
            };
            patch.apply_to(goal);
            Ok((true, true))
        })
    }

    /// Returns `false` when no goal has `id`.
    pub fn remove_goal(&mut self, id: &str) -> ServiceResult<bool> {
        self.inner.mutate(|state| {
            let before = state.goals.len();
            state.goals.retain(|goal| goal.id != id);
            let removed = state.goals.len() != before;
            Ok((removed, removed))
        })
    }

    pub fn summary(&self) -> Option<SavingsSummary> {
        self.state().map(|state| savings_summary(&state.goals))
    }

    pub fn flush(&self) {
        self.inner.flush();
    }

    pub(crate) fn shutdown(&mut self) {
        self.inner.shutdown();
    }
}
