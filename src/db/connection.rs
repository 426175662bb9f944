use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, error, info, warn};

use super::error::DbError;
use super::schema::{
    read_version, write_version, CREATE_LOGS_ORDER_INDEX, CREATE_OPERATION_LOGS,
    CREATE_ORDERS_DEVICE_STATUS_INDEX, CREATE_WORK_ORDERS, MIGRATIONS, TARGET_VERSION,
};

/// Owned handle to the local work-order database.
///
/// Callers receive the handle from [`Database::open`] and pass it wherever
/// queries are needed; there is no process-wide connection. `init` takes
/// `&mut self`, so two bootstraps can never race on the same handle.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) the database file, creating its parent directory
    /// first. Foreign keys are switched on here because SQLite ignores the
    /// pragma once a transaction is open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| DbError::DataDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path).map_err(|source| DbError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened database");

        Self::with_connection(conn, Some(path.to_path_buf()))
    }

    /// Open `path` and bring it up to date. A failure is logged here, so
    /// every caller leaves a record of it before deciding what to show.
    pub fn bootstrap(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let result = Self::open(path).and_then(|mut db| {
            db.init()?;
            Ok(db)
        });
        if let Err(err) = &result {
            error!(error = ?err, "database initialization failed");
        }
        result
    }

    /// Private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().map_err(|source| DbError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::with_connection(conn, None)
    }

    fn with_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self, DbError> {
        conn.execute_batch("PRAGMA foreign_keys = ON")
            .map_err(DbError::ForeignKeys)?;
        Ok(Self { conn, path })
    }

    /// Bring the schema up to [`TARGET_VERSION`] inside a single transaction.
    ///
    /// Tables and indexes use `IF NOT EXISTS`, and every migration step above
    /// the stored version runs in order, so calling this on an already
    /// current file is a no-op apart from rewriting the version. Any failure
    /// rolls the whole transaction back and is returned with the step that
    /// broke.
    pub fn init(&mut self) -> Result<i32, DbError> {
        let tx = self.conn.transaction().map_err(DbError::at("begin transaction"))?;

        let current = read_version(&tx).map_err(DbError::at("read schema version"))?;
        info!(current, target = TARGET_VERSION, "checking database schema version");

        tx.execute_batch(CREATE_WORK_ORDERS)
            .map_err(DbError::at("create work_orders table"))?;
        tx.execute_batch(CREATE_OPERATION_LOGS)
            .map_err(DbError::at("create operation_logs table"))?;

        tx.execute_batch(CREATE_ORDERS_DEVICE_STATUS_INDEX)
            .map_err(DbError::at("create work_orders index"))?;
        tx.execute_batch(CREATE_LOGS_ORDER_INDEX)
            .map_err(DbError::at("create operation_logs index"))?;

        let current = read_version(&tx).map_err(DbError::at("re-read schema version"))?;
        for step in MIGRATIONS.iter().filter(|m| m.version > current) {
            (step.apply)(&tx).map_err(DbError::at("apply migration"))?;
            info!(
                from = current,
                to = step.version,
                migration = step.description,
                "applied schema migration"
            );
        }

        write_version(&tx, TARGET_VERSION).map_err(DbError::at("write schema version"))?;
        tx.commit().map_err(DbError::at("commit transaction"))?;

        info!(version = TARGET_VERSION, "database initialization complete");
        Ok(TARGET_VERSION)
    }

    /// Current value of `PRAGMA user_version`.
    pub fn schema_version(&self) -> Result<i32, DbError> {
        Ok(read_version(&self.conn)?)
    }

    /// Borrow the live connection for the record helpers.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close the connection. A close error is logged and the handle dropped
    /// anyway; callers never see it.
    pub fn close(self) {
        match self.conn.close() {
            Ok(()) => info!("database closed"),
            Err((_conn, err)) => warn!(error = %err, "database close failed, dropping handle"),
        }
    }
}
