use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use studlife_core::service::savings_service::SavingsManager;
use studlife_core::store::{FixedRetry, NoRetry, PartitionStore, RetryPolicy, StoreResult};
use studlife_core::{LoadSource, Partition, SavingsGoal, StoreError, StoredBlob};

/// Store that reads nothing and fails every write.
#[derive(Default)]
struct FailingStore {
    put_attempts: AtomicU32,
}

impl PartitionStore for FailingStore {
    fn get(&self, _partition: Partition, _record_id: &str) -> StoreResult<Option<StoredBlob>> {
        Ok(None)
    }

    fn put(&self, _partition: Partition, _record_id: &str, _blob: &StoredBlob) -> StoreResult<()> {
        self.put_attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::InvalidData("disk full".to_string()))
    }
}

/// Store that keeps the last written blob per partition.
#[derive(Default)]
struct RecordingStore {
    writes: Mutex<Vec<(Partition, StoredBlob)>>,
}

impl PartitionStore for RecordingStore {
    fn get(&self, _partition: Partition, _record_id: &str) -> StoreResult<Option<StoredBlob>> {
        Ok(None)
    }

    fn put(&self, partition: Partition, _record_id: &str, blob: &StoredBlob) -> StoreResult<()> {
        self.writes.lock().unwrap().push((partition, blob.clone()));
        Ok(())
    }
}

/// Store whose read fails, as with an unreadable database.
struct UnreadableStore;

impl PartitionStore for UnreadableStore {
    fn get(&self, _partition: Partition, _record_id: &str) -> StoreResult<Option<StoredBlob>> {
        Err(StoreError::Poisoned)
    }

    fn put(&self, _partition: Partition, _record_id: &str, _blob: &StoredBlob) -> StoreResult<()> {
        Ok(())
    }
}

fn savings(store: Arc<dyn PartitionStore>, retry: Arc<dyn RetryPolicy>) -> SavingsManager {
    SavingsManager::new(store, retry, Some(10)).unwrap()
}

#[test]
fn failed_writes_never_surface_to_mutations() {
    let store = Arc::new(FailingStore::default());
    let mut manager = savings(store.clone(), Arc::new(NoRetry));

    assert_eq!(manager.load(), LoadSource::Seeded);
    manager
        .add_goal(SavingsGoal::new("Headphones", 0.0, 200.0).unwrap())
        .unwrap();
    manager.flush();

    assert_eq!(manager.state().unwrap().goals.len(), 4);
    assert!(store.put_attempts.load(Ordering::SeqCst) >= 1);
}

#[test]
fn fixed_retry_attempts_each_write_up_to_max_attempts() {
    let store = Arc::new(FailingStore::default());
    let retry = Arc::new(FixedRetry {
        max_attempts: 3,
        delay: Duration::from_millis(1),
    });
    let mut manager = savings(store.clone(), retry);

    // Loading the seed queues exactly one write.
    manager.load();
    manager.flush();

    assert_eq!(store.put_attempts.load(Ordering::SeqCst), 3);
}

#[test]
fn unchanged_records_are_not_rewritten() {
    let store = Arc::new(RecordingStore::default());
    let mut manager = savings(store.clone(), Arc::new(NoRetry));
    manager.load();
    manager.flush();
    let after_load = store.writes.lock().unwrap().len();

    assert!(!manager.remove_goal("missing").unwrap());
    manager.flush();

    assert_eq!(store.writes.lock().unwrap().len(), after_load);
    assert!(store
        .writes
        .lock()
        .unwrap()
        .iter()
        .all(|(partition, _)| *partition == Partition::Savings));
}

#[test]
fn unreadable_store_falls_back_to_seed_without_writing() {
    let mut manager = savings(Arc::new(UnreadableStore), Arc::new(NoRetry));
    assert_eq!(manager.load(), LoadSource::Fallback);
    assert_eq!(manager.state().unwrap().goals.len(), 3);
}
