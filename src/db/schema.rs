//! Schema statements and the ordered migration steps applied on top of them.

use rusqlite::Connection;

/// SQLite file name stored inside the application data directory.
pub const DB_FILE_NAME: &str = "coalMineDB.db";
/// Value written to `PRAGMA user_version` once bootstrap succeeds.
pub const TARGET_VERSION: i32 = 2;

pub(crate) const CREATE_WORK_ORDERS: &str = "
    CREATE TABLE IF NOT EXISTS work_orders (
        id TEXT PRIMARY KEY NOT NULL,
        device_id TEXT NOT NULL,
        status TEXT NOT NULL,
        create_time TEXT NOT NULL,
        priority INTEGER DEFAULT 1,
        handler TEXT
    )";

pub(crate) const CREATE_OPERATION_LOGS: &str = "
    CREATE TABLE IF NOT EXISTS operation_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        order_id TEXT NOT NULL,
        action TEXT NOT NULL,
        operator TEXT NOT NULL,
        time TEXT NOT NULL,
        FOREIGN KEY(order_id) REFERENCES work_orders(id) ON DELETE CASCADE
    )";

/// Orders are looked up by device and status far more than anything else.
pub(crate) const CREATE_ORDERS_DEVICE_STATUS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_orders_device_status ON work_orders (device_id, status)";

pub(crate) const CREATE_LOGS_ORDER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_logs_order_id ON operation_logs (order_id)";

/// One additive schema change. Steps run in slice order for every version
/// above the stored `user_version`.
pub(crate) struct Migration {
    pub(crate) version: i32,
    pub(crate) description: &'static str,
    pub(crate) apply: fn(&Connection) -> rusqlite::Result<()>,
}

pub(crate) const MIGRATIONS: &[Migration] = &[Migration {
    version: 2,
    description: "add work_orders.handler",
    apply: add_handler_column,
}];

/// `CREATE TABLE` above already carries `handler`, so a fresh file reaches
/// this step with the column present. Only v1 files need the ALTER.
fn add_handler_column(conn: &Connection) -> rusqlite::Result<()> {
    if column_exists(conn, "work_orders", "handler")? {
        return Ok(());
    }
    conn.execute_batch("ALTER TABLE work_orders ADD COLUMN handler TEXT")
}

pub(crate) fn column_exists(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        [table, column],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub(crate) fn read_version(conn: &Connection) -> rusqlite::Result<i32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

pub(crate) fn write_version(conn: &Connection, version: i32) -> rusqlite::Result<()> {
    // PRAGMA does not accept bound parameters.
    conn.execute_batch(&format!("PRAGMA user_version = {version}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered_and_end_at_target() {
        let versions: Vec<i32> = MIGRATIONS.iter().map(|m| m.version).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(versions, sorted);
        assert_eq!(versions.last().copied(), Some(TARGET_VERSION));
    }

    #[test]
    fn handler_migration_skips_existing_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_WORK_ORDERS).unwrap();

        add_handler_column(&conn).unwrap();
        add_handler_column(&conn).unwrap();

        assert!(column_exists(&conn, "work_orders", "handler").unwrap());
    }

    #[test]
    fn version_round_trips_through_pragma() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_version(&conn).unwrap(), 0);
        write_version(&conn, 7).unwrap();
        assert_eq!(read_version(&conn).unwrap(), 7);
    }

    #[test]
    fn negative_version_reads_as_signed() {
        let conn = Connection::open_in_memory().unwrap();
        write_version(&conn, -3).unwrap();
        assert_eq!(read_version(&conn).unwrap(), -3);
    }
}
