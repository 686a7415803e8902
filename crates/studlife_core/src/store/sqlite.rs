//! SQLite-backed partition store handle.
//!
//! # Responsibility
//! - Own the single database connection for the app.
//! - Upgrade outdated partition blobs once, at open time.
//! - Serve whole-blob `get`/`put` for managers and writer threads.
//!
//! # Invariants
//! - The connection is only reachable through the internal mutex.
//! - After `close`, every call returns `StoreError::Closed`.
//! - Blobs newer than the supported schema are left untouched.

use super::{Partition, PartitionStore, StoreError, StoreResult, StoredBlob};
use crate::db::{open_db, open_db_in_memory};
use crate::model::schema::{migrate_blob, CURRENT_SCHEMA_VERSION};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Explicitly constructed handle to the local store.
pub struct Store {
    conn: Mutex<Option<Connection>>,
}

impl Store {
    /// Opens (or creates) a file-backed store and upgrades stored blobs.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let mut conn = open_db(path)?;
        migrate_partitions(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Opens a throwaway in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let mut conn = open_db_in_memory()?;
        migrate_partitions(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Closes the underlying connection. Idempotent.
    pub fn close(&self) -> StoreResult<()> {
        let mut guard = self.lock()?;
        let Some(conn) = guard.take() else {
            return Ok(());
        };
        conn.close().map_err(|(_, err)| StoreError::from(err))?;
        info!("event=store_close module=store status=ok");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.lock().map_or(true, |guard| guard.is_none())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Option<Connection>>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn with_conn<T>(&self, op: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        op(conn)
    }
}

impl PartitionStore for Store {
    fn get(&self, partition: Partition, record_id: &str) -> StoreResult<Option<StoredBlob>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT schema_version, payload
                     FROM partitions
                     WHERE name = ?1 AND record_id = ?2;",
                    params![partition.as_str(), record_id],
                    |row| {
                        Ok(StoredBlob {
                            schema_version: row.get(0)?,
                            payload: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    fn put(&self, partition: Partition, record_id: &str, blob: &StoredBlob) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO partitions (name, record_id, schema_version, payload, updated_at)
                 VALUES (?1, ?2, ?3, ?4, (strftime('%s', 'now') * 1000))
                 ON CONFLICT (name, record_id) DO UPDATE SET
                    schema_version = excluded.schema_version,
                    payload = excluded.payload,
                    updated_at = excluded.updated_at;",
                params![
                    partition.as_str(),
                    record_id,
                    blob.schema_version,
                    blob.payload.as_str()
                ],
            )?;
            Ok(())
        })
    }
}

/// Rewrites every outdated partition row at the current blob version.
///
/// Rows that fail to decode are kept as-is and logged; managers fall back to
/// seed data for them on load.
fn migrate_partitions(conn: &mut Connection) -> StoreResult<()> {
    let tx = conn.transaction()?;
    let outdated = {
        let mut stmt = tx.prepare(
            "SELECT name, record_id, schema_version, payload
             FROM partitions
             WHERE schema_version < ?1
             ORDER BY name, record_id;",
        )?;
        let rows = stmt.query_map([CURRENT_SCHEMA_VERSION], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                StoredBlob {
                    schema_version: row.get(2)?,
                    payload: row.get(3)?,
                },
            ))
        })?;
        let collected = rows.collect::<Result<Vec<_>, _>>()?;
        collected
    };

    let mut migrated = 0usize;
    for (name, record_id, blob) in outdated {
        let partition = Partition::parse(&name).ok_or_else(|| {
            StoreError::InvalidData(format!("unknown partition `{name}` in partitions.name"))
        })?;
        match migrate_blob(partition, &blob) {
            Ok(upgraded) => {
                tx.execute(
                    "UPDATE partitions
                     SET schema_version = ?3, payload = ?4
                     WHERE name = ?1 AND record_id = ?2;",
                    params![
                        name,
                        record_id,
                        upgraded.schema_version,
                        upgraded.payload.as_str()
                    ],
                )?;
                migrated += 1;
            }
            Err(err) => warn!(
                "event=blob_migrate module=store status=error partition={} from_version={} error={}",
                partition, blob.schema_version, err
            ),
        }
    }
    tx.commit()?;

    if migrated > 0 {
        info!(
            "event=blob_migrate module=store status=ok migrated={} to_version={}",
            migrated, CURRENT_SCHEMA_VERSION
        );
    }
    Ok(())
}
