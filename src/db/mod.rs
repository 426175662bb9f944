//! Persistence module split across logical submodules.

mod connection;
mod error;
mod operation_logs;
mod schema;
mod work_orders;

pub use connection::Database;
pub use error::DbError;
pub use operation_logs::{append_log, fetch_logs_for_order};
pub use schema::{DB_FILE_NAME, TARGET_VERSION};
pub use work_orders::{
    assign_handler, create_work_order, delete_work_order, fetch_orders_for_device,
    fetch_work_order,
};
