//! Shared load/mutate/persist cycle for one partition.
//!
//! # Responsibility
//! - Hydrate a partition record from the store, or from its seed.
//! - Apply mutations atomically to the in-memory record.
//! - Hand every committed record to the partition's write-behind queue.
//!
//! # Invariants
//! - Lifecycle is `Uninitialized -> Loading -> Ready`; it never goes back.
//! - A mutation that returns an error leaves the in-memory record unchanged.
//! - In-memory state is the source of truth; write outcome never changes it.

use crate::model::schema::{decode, encode, PartitionRecord};
use crate::seed::seed;
use crate::service::{ServiceError, ServiceResult};
use crate::store::{PartitionStore, PartitionWriter, RetryPolicy, MAIN_RECORD_ID};
use log::{error, info, warn};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Uninitialized,
    Loading,
    Ready,
}

/// Where the hydrated record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Stored,
    /// Partition was absent; the seed was written back.
    Seeded,
    /// Stored row was unreadable; the seed is used in memory only.
    Fallback,
}

pub struct PartitionManager<T: PartitionRecord> {
    store: Arc<dyn PartitionStore>,
    writer: PartitionWriter,
    phase: LoadPhase,
    source: Option<LoadSource>,
    record: Option<T>,
}

impl<T: PartitionRecord> PartitionManager<T> {
    pub fn new(store: Arc<dyn PartitionStore>, retry: Arc<dyn RetryPolicy>) -> ServiceResult<Self> {
        let writer = PartitionWriter::spawn(Arc::clone(&store), T::PARTITION, MAIN_RECORD_ID, retry)?;
        Ok(Self {
            store,
            writer,
            phase: LoadPhase::Uninitialized,
            source: None,
            record: None,
        })
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// `true` until the first load completes.
    pub fn is_loading(&self) -> bool {
        self.phase != LoadPhase::Ready
    }

    /// Where the record came from, once loaded.
    pub fn load_source(&self) -> Option<LoadSource> {
        self.source
    }

    /// Current record, `None` while loading.
    pub fn state(&self) -> Option<&T> {
        self.record.as_ref()
    }

    /// Hydrates the record. Calling it again once ready is a no-op.
    pub fn load(&mut self) -> LoadSource {
        if let (LoadPhase::Ready, Some(source)) = (self.phase, self.source) {
            return source;
        }
        self.phase = LoadPhase::Loading;

        let partition = T::PARTITION;
        let (record, source) = match self.store.get(partition, MAIN_RECORD_ID) {
            Ok(Some(blob)) => match decode::<T>(&blob) {
                Ok(record) => (record, LoadSource::Stored),
                Err(err) => {
                    warn!(
                        "event=partition_load module=service status=error partition={} error_code=decode_failed error={}",
                        partition, err
                    );
                    (seed::<T>(), LoadSource::Fallback)
                }
            },
            Ok(None) => (seed::<T>(), LoadSource::Seeded),
            Err(err) => {
                warn!(
                    "event=partition_load module=service status=error partition={} error_code=store_get_failed error={}",
                    partition, err
                );
                (seed::<T>(), LoadSource::Fallback)
            }
        };

        self.record = Some(record);
        self.source = Some(source);
        self.phase = LoadPhase::Ready;
        if source == LoadSource::Seeded {
            self.persist();
        }
        info!(
            "event=partition_load module=service status=ok partition={} source={:?}",
            partition, source
        );
        source
    }

    /// Applies `op` to a working copy and commits it only on success.
    ///
    /// `op` returns `(changed, value)`; unchanged records are not rewritten.
    pub fn mutate<R>(
        &mut self,
        op: impl FnOnce(&mut T) -> ServiceResult<(bool, R)>,
    ) -> ServiceResult<R> {
        let current = self
            .record
            .as_ref()
            .ok_or(ServiceError::NotReady(T::PARTITION))?;
        let mut working = current.clone();
        let (changed, value) = op(&mut working)?;
        if changed {
            self.record = Some(working);
            self.persist();
        }
        Ok(value)
    }

    /// Blocks until queued writes for this partition were attempted.
    pub fn flush(&self) {
        self.writer.flush();
    }

    pub(crate) fn shutdown(&mut self) {
        self.writer.shutdown();
    }

    fn persist(&self) {
        let Some(record) = self.record.as_ref() else {
            return;
        };
        match encode(record) {
            Ok(blob) => self.writer.enqueue(blob),
            Err(err) => error!(
                "event=partition_write module=service status=error partition={} error_code=encode_failed error={}",
                T::PARTITION,
                err
            ),
        }
    }
}
