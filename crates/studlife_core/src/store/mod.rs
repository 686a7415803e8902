//! Local partition store.
//!
//! # Responsibility
//! - Define the four fixed partitions and the `get`/`put` blob contract.
//! - Provide the SQLite-backed store handle with explicit open/close.
//! - Provide the per-partition write-behind queue used by managers.
//!
//! # Invariants
//! - Each partition holds exactly one logical record (`MAIN_RECORD_ID`).
//! - No write spans more than one partition.
//! - A failed write never changes what the next successful read returns.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;
pub mod writer;

pub use sqlite::Store;
pub use writer::{FixedRetry, NoRetry, PartitionWriter, RetryPolicy};

/// Fixed id of the singleton record inside every partition.
pub const MAIN_RECORD_ID: &str = "main";

pub type StoreResult<T> = Result<T, StoreError>;

/// Named, independent slice of the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Partition {
    Sleep,
    Savings,
    Payments,
    Jobs,
}

impl Partition {
    pub const ALL: [Partition; 4] = [
        Partition::Sleep,
        Partition::Savings,
        Partition::Payments,
        Partition::Jobs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Savings => "savings",
            Self::Payments => "payments",
            Self::Jobs => "jobs",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|partition| partition.as_str() == value)
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized partition record plus the blob schema version it was written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub schema_version: u32,
    /// JSON document in the record shape of the partition.
    pub payload: String,
}

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Store handle was closed explicitly.
    Closed,
    /// Connection mutex was poisoned by a panicking holder.
    Poisoned,
    /// Background writer thread could not be started.
    WorkerSpawn(std::io::Error),
    /// Stored row cannot be interpreted.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Closed => write!(f, "store is closed"),
            Self::Poisoned => write!(f, "store connection lock poisoned"),
            Self::WorkerSpawn(err) => write!(f, "failed to start partition writer: {err}"),
            Self::InvalidData(message) => write!(f, "invalid stored partition data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::WorkerSpawn(err) => Some(err),
            Self::Closed | Self::Poisoned | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable get/put of whole partition blobs.
///
/// Implementations must be shareable with background writer threads.
pub trait PartitionStore: Send + Sync {
    fn get(&self, partition: Partition, record_id: &str) -> StoreResult<Option<StoredBlob>>;
    fn put(&self, partition: Partition, record_id: &str, blob: &StoredBlob) -> StoreResult<()>;
}
