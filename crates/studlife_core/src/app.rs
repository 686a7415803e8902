//! Composition root wiring one store handle into the four managers.
//!
//! # Responsibility
//! - Open the store explicitly and inject it into every manager.
//! - Load all partitions and expose the dashboard summary.
//! - Flush pending writes and close the store on shutdown.
//!
//! # Invariants
//! - All managers share the same store handle.
//! - `close` attempts every queued write before the connection is released.

use crate::config::{CoreConfig, FeatureLimits, RetryPolicyConfig};
use crate::service::jobs_service::JobsManager;
use crate::service::payments_service::PaymentsManager;
use crate::service::savings_service::SavingsManager;
use crate::service::sleep_service::SleepManager;
use crate::service::stats::{dashboard_summary, DashboardSummary};
use crate::service::ServiceResult;
use crate::store::{PartitionStore, RetryPolicy, Store, StoreResult};
use log::info;
use std::sync::Arc;

pub struct AppCore {
    store: Arc<Store>,
    pub sleep: SleepManager,
    pub savings: SavingsManager,
    pub payments: PaymentsManager,
    pub jobs: JobsManager,
}

impl AppCore {
    /// Opens the configured store and builds unloaded managers.
    pub fn open(config: &CoreConfig) -> ServiceResult<Self> {
        let store = Arc::new(Store::open(&config.db_path)?);
        Self::with_store(store, config.limits, config.write_retry.build())
    }

    /// In-memory variant used by tests and previews.
    pub fn open_in_memory(limits: FeatureLimits) -> ServiceResult<Self> {
        let store = Arc::new(Store::open_in_memory()?);
        Self::with_store(store, limits, RetryPolicyConfig::default().build())
    }

    pub fn with_store(
        store: Arc<Store>,
        limits: FeatureLimits,
        retry: Arc<dyn RetryPolicy>,
    ) -> ServiceResult<Self> {
        let shared: Arc<dyn PartitionStore> = store.clone();
        Ok(Self {
            sleep: SleepManager::new(Arc::clone(&shared), Arc::clone(&retry))?,
            savings: SavingsManager::new(Arc::clone(&shared), Arc::clone(&retry), limits.max_goals)?,
            payments: PaymentsManager::new(
                Arc::clone(&shared),
                Arc::clone(&retry),
                limits.max_active_reminders,
            )?,
            jobs: JobsManager::new(shared, retry)?,
            store,
        })
    }

    /// Loads every partition that is not loaded yet.
    pub fn load_all(&mut self) {
        self.sleep.load();
        self.savings.load();
        self.payments.load();
        self.jobs.load();
    }

    pub fn dashboard(&self) -> DashboardSummary {
        dashboard_summary(
            self.sleep.state(),
            self.savings.state(),
            self.payments.state(),
            self.jobs.state(),
        )
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Blocks until queued writes of every partition were attempted.
    pub fn flush(&self) {
        self.sleep.flush();
        self.savings.flush();
        self.payments.flush();
        self.jobs.flush();
    }

    /// Drains all writers, then closes the store.
    pub fn close(mut self) -> StoreResult<()> {
        self.sleep.shutdown();
        self.savings.shutdown();
        self.payments.shutdown();
        self.jobs.shutdown();
        self.store.close()?;
        info!("event=app_close module=app status=ok");
        Ok(())
    }
}
