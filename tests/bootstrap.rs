use std::path::Path;

use coal_mine_orders::db::{DB_FILE_NAME, TARGET_VERSION};
use coal_mine_orders::{Database, DbError};
use rusqlite::Connection;
use tempfile::TempDir;

fn columns(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
        .unwrap();
    stmt.query_map([table], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

fn object_exists(conn: &Connection, kind: &str, name: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2",
        [kind, name],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        > 0
}

fn schema_sql(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT sql FROM sqlite_master WHERE sql IS NOT NULL ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

fn user_version(path: &Path) -> i32 {
    let conn = Connection::open(path).unwrap();
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn fresh_file_gets_full_schema() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(DB_FILE_NAME);

    let mut db = Database::open(&path).unwrap();
    assert_eq!(db.init().unwrap(), TARGET_VERSION);

    let conn = db.conn();
    assert_eq!(
        columns(conn, "work_orders"),
        ["id", "device_id", "status", "create_time", "priority", "handler"]
    );
    assert_eq!(
        columns(conn, "operation_logs"),
        ["id", "order_id", "action", "operator", "time"]
    );
    assert!(object_exists(conn, "index", "idx_orders_device_status"));
    assert!(object_exists(conn, "index", "idx_logs_order_id"));
    assert_eq!(db.schema_version().unwrap(), 2);

    db.close();
    assert_eq!(user_version(&path), 2);
}

#[test]
fn second_init_leaves_schema_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(DB_FILE_NAME);

    let mut db = Database::open(&path).unwrap();
    db.init().unwrap();
    let first = schema_sql(db.conn());

    db.init().unwrap();
    assert_eq!(schema_sql(db.conn()), first);
    assert_eq!(
        columns(db.conn(), "work_orders")
            .iter()
            .filter(|c| c.as_str() == "handler")
            .count(),
        1
    );
    db.close();

    let mut reopened = Database::open(&path).unwrap();
    reopened.init().unwrap();
    assert_eq!(schema_sql(reopened.conn()), first);
    reopened.close();
}

#[test]
fn version_one_file_gains_handler_and_keeps_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(DB_FILE_NAME);

    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE work_orders (
                id TEXT PRIMARY KEY NOT NULL,
                device_id TEXT NOT NULL,
                status TEXT NOT NULL,
                create_time TEXT NOT NULL,
                priority INTEGER DEFAULT 1
            );
            INSERT INTO work_orders (id, device_id, status, create_time, priority)
                VALUES ('WO-1', 'pump-7', 'open', '2024-03-01T08:00:00', 3);
            INSERT INTO work_orders (id, device_id, status, create_time)
                VALUES ('WO-2', 'belt-2', 'closed', '2024-03-02T09:30:00');
            PRAGMA user_version = 1;",
        )
        .unwrap();
    }

    let mut db = Database::open(&path).unwrap();
    assert_eq!(db.schema_version().unwrap(), 1);
    db.init().unwrap();

    assert!(columns(db.conn(), "work_orders").contains(&"handler".to_string()));
    let rows: Vec<(String, i64, Option<String>)> = {
        let mut stmt = db
            .conn()
            .prepare("SELECT id, priority, handler FROM work_orders ORDER BY id")
            .unwrap();
        stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    };
    assert_eq!(
        rows,
        vec![("WO-1".to_string(), 3, None), ("WO-2".to_string(), 1, None)]
    );
    assert_eq!(db.schema_version().unwrap(), 2);
    db.close();
}

#[test]
fn negative_version_file_is_migrated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(DB_FILE_NAME);

    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE work_orders (
                id TEXT PRIMARY KEY NOT NULL,
                device_id TEXT NOT NULL,
                status TEXT NOT NULL,
                create_time TEXT NOT NULL,
                priority INTEGER DEFAULT 1
            );
            PRAGMA user_version = -5;",
        )
        .unwrap();
    }

    let mut db = Database::open(&path).unwrap();
    assert_eq!(db.schema_version().unwrap(), -5);
    assert_eq!(db.init().unwrap(), TARGET_VERSION);

    assert!(columns(db.conn(), "work_orders").contains(&"handler".to_string()));
    db.close();
    assert_eq!(user_version(&path), 2);
}

#[test]
fn failed_bootstrap_rolls_back_everything() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(DB_FILE_NAME);

    {
        let conn = Connection::open(&path).unwrap();
        // No device_id column, so the composite index cannot be built.
        conn.execute_batch("CREATE TABLE work_orders (id TEXT PRIMARY KEY NOT NULL)")
            .unwrap();
    }

    let mut db = Database::open(&path).unwrap();
    let err = db.init().unwrap_err();
    assert!(matches!(err, DbError::Bootstrap { .. }));

    assert!(!object_exists(db.conn(), "table", "operation_logs"));
    assert!(!object_exists(db.conn(), "index", "idx_orders_device_status"));
    assert_eq!(db.schema_version().unwrap(), 0);
    db.close();
}

#[test]
fn bootstrap_opens_and_initializes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(DB_FILE_NAME);

    let db = Database::bootstrap(&path).unwrap();
    assert_eq!(db.schema_version().unwrap(), TARGET_VERSION);
    db.close();
}

#[test]
fn bootstrap_returns_init_failure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(DB_FILE_NAME);
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE work_orders (id TEXT PRIMARY KEY NOT NULL)")
            .unwrap();
    }

    let err = Database::bootstrap(&path).err().unwrap();
    assert!(matches!(err, DbError::Bootstrap { .. }));
    assert_eq!(user_version(&path), 0);
}

#[test]
fn close_without_init_succeeds() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join(DB_FILE_NAME);

    let db = Database::open(&path).unwrap();
    assert_eq!(db.path(), Some(path.as_path()));
    db.close();

    assert!(path.exists());
    assert_eq!(user_version(&path), 0);
}
