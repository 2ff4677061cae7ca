use ideabox_core::db::migrations::latest_version;
use ideabox_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().expect("open in-memory db");

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "notes");
    assert_table_exists(&conn, "projects");
}

#[test]
fn reopening_a_database_file_keeps_schema() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("ideabox.db");

    drop(open_db(&path).expect("first open"));
    let conn = open_db(&path).expect("second open");
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "projects");
}

#[test]
fn newer_schema_version_is_refused() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).expect("raw open");
    conn.execute_batch("PRAGMA user_version = 999;")
        .expect("bump version");
    drop(conn);

    let err = open_db(&path).expect_err("newer schema must be refused");
    assert_eq!(err.code(), "unsupported_schema");
    assert!(err.to_string().contains("schema v999"));
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
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .expect("read user_version")
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
        .expect("query sqlite_master");
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
