//! Per-partition write-behind queue.
//!
//! # Responsibility
//! - Accept partition blobs without blocking the caller.
//! - Persist them on a dedicated worker thread, latest blob wins.
//! - Consult a [`RetryPolicy`] after a failed write.
//!
//! # Invariants
//! - `enqueue` never blocks and never fails from the caller's view.
//! - Jobs queued before a `flush` are attempted before `flush` returns.
//! - Write failures are logged and dropped once the policy gives up.

use super::{Partition, PartitionStore, StoreError, StoreResult, StoredBlob};
use log::{debug, error, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Decides whether a failed write should be attempted again.
pub trait RetryPolicy: Send + Sync {
    /// Returns the delay before attempt `attempt + 1`, or `None` to give up.
    fn next_delay(&self, attempt: u32, err: &StoreError) -> Option<Duration>;
}

/// Never retries; the next mutation triggers a fresh write anyway.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn next_delay(&self, _attempt: u32, _err: &StoreError) -> Option<Duration> {
        None
    }
}

/// Retries with a constant delay up to `max_attempts` total attempts.
#[derive(Debug, Clone, Copy)]
pub struct FixedRetry {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy for FixedRetry {
    fn next_delay(&self, attempt: u32, err: &StoreError) -> Option<Duration> {
        if matches!(err, StoreError::Closed) || attempt >= self.max_attempts {
            return None;
        }
        Some(self.delay)
    }
}

enum WriterMessage {
    Write(StoredBlob),
    Flush(Sender<()>),
}

/// Background writer owning the write queue of one partition.
pub struct PartitionWriter {
    partition: Partition,
    sender: Option<Sender<WriterMessage>>,
    worker: Option<JoinHandle<()>>,
}

impl PartitionWriter {
    /// Starts the worker thread for `partition`.
    pub fn spawn(
        store: Arc<dyn PartitionStore>,
        partition: Partition,
        record_id: impl Into<String>,
        retry: Arc<dyn RetryPolicy>,
    ) -> StoreResult<Self> {
        let (sender, receiver) = mpsc::channel();
        let record_id = record_id.into();
        let worker = thread::Builder::new()
            .name(format!("studlife-writer-{partition}"))
            .spawn(move || run_worker(store, partition, record_id, retry, receiver))
            .map_err(StoreError::WorkerSpawn)?;

        Ok(Self {
            partition,
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    /// Queues a blob for persistence and returns immediately.
    pub fn enqueue(&self, blob: StoredBlob) {
        let sent = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(WriterMessage::Write(blob)).is_ok());
        if !sent {
            warn!(
                "event=partition_write module=store status=skipped partition={} reason=writer_stopped",
                self.partition
            );
        }
    }

    /// Blocks until every blob queued so far has been attempted.
    pub fn flush(&self) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };
        let (ack_tx, ack_rx) = mpsc::channel();
        if sender.send(WriterMessage::Flush(ack_tx)).is_ok() {
            // A dropped ack means the worker exited; nothing left to wait for.
            let _ = ack_rx.recv();
        }
    }

    /// Drains the queue and stops the worker. Idempotent.
    pub fn shutdown(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(
                    "event=writer_shutdown module=store status=error partition={} error_code=worker_panicked",
                    self.partition
                );
            }
        }
    }
}

impl Drop for PartitionWriter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(
    store: Arc<dyn PartitionStore>,
    partition: Partition,
    record_id: String,
    retry: Arc<dyn RetryPolicy>,
    receiver: Receiver<WriterMessage>,
) {
    while let Ok(first) = receiver.recv() {
        let mut latest = None;
        let mut waiters = Vec::new();

        // Coalesce everything already queued so only the newest blob is written.
        let mut next = Some(first);
        while let Some(message) = next {
            match message {
                WriterMessage::Write(blob) => latest = Some(blob),
                WriterMessage::Flush(ack) => waiters.push(ack),
            }
            next = receiver.try_recv().ok();
        }

        if let Some(blob) = latest {
            write_with_retry(store.as_ref(), partition, &record_id, &blob, retry.as_ref());
        }
        for ack in waiters {
            let _ = ack.send(());
        }
    }
    debug!(
        "event=writer_shutdown module=store status=ok partition={}",
        partition
    );
}

fn write_with_retry(
    store: &dyn PartitionStore,
    partition: Partition,
    record_id: &str,
    blob: &StoredBlob,
    retry: &dyn RetryPolicy,
) {
    let mut attempt = 1u32;
    loop {
        match store.put(partition, record_id, blob) {
            Ok(()) => {
                debug!(
                    "event=partition_write module=store status=ok partition={} attempt={} bytes={}",
                    partition,
                    attempt,
                    blob.payload.len()
                );
                return;
            }
            Err(err) => match retry.next_delay(attempt, &err) {
                Some(delay) => {
                    warn!(
                        "event=partition_write module=store status=retry partition={} attempt={} delay_ms={} error={}",
                        partition,
                        attempt,
                        delay.as_millis(),
                        err
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                None => {
                    warn!(
                        "event=partition_write module=store status=error partition={} attempt={} error_code=write_dropped error={}",
                        partition, attempt, err
                    );
                    return;
                }
            },
        }
    }
}
