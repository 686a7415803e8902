//! Jobs feature state manager.

use crate::model::jobs::{Job, JobsState};
use crate::service::job_query::{filter_jobs, JobQuery};
use crate::service::partition::{LoadPhase, LoadSource, PartitionManager};
use crate::service::{ServiceError, ServiceResult};
use crate::store::{Partition, PartitionStore, RetryPolicy};
use std::sync::Arc;

pub struct JobsManager {
    inner: PartitionManager<JobsState>,
}

impl JobsManager {
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

    pub fn state(&self) -> Option<&JobsState> {
        self.inner.state()
    }

    /// Flips the favorite flag; returns the new value, or `None` for an
    /// unknown id.
    pub fn toggle_favorite(&mut self, id: &str) -> ServiceResult<Option<bool>> {
        self.inner.mutate(|state| {
            let Some(job) = state.jobs.iter_mut().find(|job| job.id == id) else {
                return Ok((false, None));
            };
            job.is_favorite = !job.is_favorite;
            Ok((true, Some(job.is_favorite)))
        })
    }

    pub fn add_job(&mut self, job: Job) -> ServiceResult<()> {
        job.validate()?;
        self.inner.mutate(|state| {
            if state.jobs.iter().any(|existing| existing.id == job.id) {
                return Err(ServiceError::DuplicateId {
                    partition: Partition::Jobs,
                    id: job.id.clone(),
                });
            }
            state.jobs.push(job);
            Ok((true, ()))
        })
    }

    /// Runs `query` over the current snapshot; empty while loading.
    pub fn query(&self, query: &JobQuery) -> Vec<&Job> {
        self.state()
            .map(|state| filter_jobs(&state.jobs, query))
            .unwrap_or_default()
    }

    pub fn flush(&self) {
        self.inner.flush();
    }

    pub(crate) fn shutdown(&mut self) {
        self.inner.shutdown();
    }
}
