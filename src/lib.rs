//! Core library surface for the coal mine work-order application.
//!
//! Two independent pieces live here: the SQLite bootstrapper in [`db`] and
//! the terminal screen in [`ui`]. The binary wires them together; nothing
//! flows between them.
//!
//! ```no_run
//! use coal_mine_orders::Database;
//!
//! let mut db = Database::open("coalMineDB.db")?;
//! db.init()?;
//! db.close();
//! # Ok::<(), coal_mine_orders::DbError>(())
//! ```
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod profile;
pub mod ui;

pub use config::AppConfig;
pub use db::{Database, DbError};
pub use models::{OperationLog, WorkOrder};
pub use ui::{run_app, App};
