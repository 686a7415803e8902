//! Table-level schema for the partition store.
//!
//! # Responsibility
//! - Create and evolve the `partitions` table that holds one JSON blob per
//!   `(partition name, record id)`.
//! - Record the applied table schema in `PRAGMA user_version`.
//!
//! # Invariants
//! - `partitions.name` is constrained to the four partition names of
//!   `store::Partition`; a row for any other name cannot exist.
//! - `schema_version` on each row is the blob version, independent of the
//!   table version tracked here. Blob upgrades live in `model::schema`.
//! - Pending steps run in one transaction; a failed step leaves the table
//!   version unchanged.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "partitions",
    sql: include_str!("0001_partitions.sql"),
}];

/// Table schema version this binary creates.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the `partitions` table up to [`latest_version`].
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file was written by a newer
///   build; it is never downgraded.
/// - `DbError::Migration` naming the step whose SQL failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)
            .and_then(|()| {
                tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
            })
            .map_err(|source| DbError::Migration {
                version: migration.version,
                name: migration.name,
                source,
            })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        from_version,
        latest,
        pending.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, MIGRATIONS};
    use crate::store::Partition;
    use rusqlite::{params, Connection};

    #[test]
    fn versions_increase_strictly() {
        assert!(MIGRATIONS
            .windows(2)
            .all(|pair| pair[0].version < pair[1].version));
        assert_eq!(latest_version(), 1);
    }

    #[test]
    fn name_check_admits_exactly_the_store_partitions() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();

        let insert = "INSERT INTO partitions (name, record_id, schema_version, payload)
                      VALUES (?1, 'main', 2, '{}');";
        for partition in Partition::ALL {
            conn.execute(insert, params![partition.as_str()]).unwrap();
        }
        for rejected in ["notes", "Sleep", ""] {
            assert!(conn.execute(insert, params![rejected]).is_err(), "{rejected}");
        }
    }

    #[test]
    fn blob_version_must_be_positive() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();

        let result = conn.execute(
            "INSERT INTO partitions (name, record_id, schema_version, payload)
             VALUES ('jobs', 'main', 0, '{}');",
            [],
        );
        assert!(result.is_err());
    }
}
