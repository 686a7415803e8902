use rusqlite::{params, Connection};
use studlife_core::db::migrations::latest_version;
use studlife_core::db::{open_db, open_db_in_memory, DbError};
use studlife_core::model::schema::CURRENT_SCHEMA_VERSION;
use studlife_core::store::{Partition, PartitionStore, Store, StoreError, MAIN_RECORD_ID};
use studlife_core::{SleepState, StoredBlob};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "partitions");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studlife.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "partitions");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }

    let store_err = Store::open(&path).err().unwrap();
    assert!(matches!(store_err, StoreError::Db(DbError::UnsupportedSchemaVersion { .. })));
}

#[test]
fn partitions_table_rejects_unknown_partition_names() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO partitions (name, record_id, schema_version, payload) VALUES ('notes', 'main', 2, '{}');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn store_open_upgrades_legacy_blobs_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let conn = open_db(&path).unwrap();
    insert_raw(
        &conn,
        "sleep",
        1,
        r#"{"id":"main","settings":{"targetHours":7,"bedTime":"23:00","wakeTime":"06:00"},
            "history":[
              {"date":"2025-11-24","sleepStart":"23:00","sleepEnd":"07:00","hours":8},
              {"date":"24.11.2025","sleepStart":"00:00","sleepEnd":"06:00","hours":6},
              {"date":"2025-11-20","sleepStart":"23:00","sleepEnd":"07:00","hours":8}
            ]}"#,
    );
    insert_raw(&conn, "savings", 1, r#"{"id":"main","goals":[]}"#);
    insert_raw(&conn, "jobs", 1, "not json");
    drop(conn);

    let store = Store::open(&path).unwrap();

    let sleep = store.get(Partition::Sleep, MAIN_RECORD_ID).unwrap().unwrap();
    assert_eq!(sleep.schema_version, CURRENT_SCHEMA_VERSION);
    let state: SleepState = serde_json::from_str(&sleep.payload).unwrap();
    let dates: Vec<&str> = state.history.iter().map(|entry| entry.date.as_str()).collect();
    assert_eq!(dates, vec!["20.11.2025", "24.11.2025"]);
    assert_eq!(state.history[1].hours, 6.0);

    let savings = store.get(Partition::Savings, MAIN_RECORD_ID).unwrap().unwrap();
    assert_eq!(savings.schema_version, CURRENT_SCHEMA_VERSION);

    // Undecodable rows stay as they were.
    let jobs = store.get(Partition::Jobs, MAIN_RECORD_ID).unwrap().unwrap();
    assert_eq!(
        jobs,
        StoredBlob {
            schema_version: 1,
            payload: "not json".to_string()
        }
    );
}

fn insert_raw(conn: &Connection, name: &str, version: u32, payload: &str) {
    conn.execute(
        "INSERT INTO partitions (name, record_id, schema_version, payload) VALUES (?1, 'main', ?2, ?3);",
        params![name, version, payload],
    )
    .unwrap();
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
