use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, Error as SqlError, ErrorCode};

use crate::models::OperationLog;

/// Append an audit entry. The foreign key rejects entries for orders that
/// do not exist.
pub fn append_log(
    conn: &Connection,
    order_id: &str,
    action: &str,
    operator: &str,
    time: &str,
) -> Result<OperationLog> {
    conn.execute(
        "INSERT INTO operation_logs (order_id, action, operator, time) VALUES (?1, ?2, ?3, ?4)",
        params![order_id, action, operator, time],
    )
    .map_err(|err| map_missing_order(err, order_id))
    .context("failed to append operation log")?;

    Ok(OperationLog {
        id: conn.last_insert_rowid(),
        order_id: order_id.to_string(),
        action: action.to_string(),
        operator: operator.to_string(),
        time: time.to_string(),
    })
}

/// Every log entry for one order, oldest first.
pub fn fetch_logs_for_order(conn: &Connection, order_id: &str) -> Result<Vec<OperationLog>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, order_id, action, operator, time
             FROM operation_logs
             WHERE order_id = ?1
             ORDER BY id",
        )
        .context("failed to prepare operation log query")?;

    let logs = stmt
        .query_map([order_id], |row| {
            Ok(OperationLog {
                id: row.get(0)?,
                order_id: row.get(1)?,
                action: row.get(2)?,
                operator: row.get(3)?,
                time: row.get(4)?,
            })
        })
        .context("failed to load operation logs")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect operation logs")?;

    Ok(logs)
}

fn map_missing_order(err: SqlError, order_id: &str) -> anyhow::Error {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        anyhow!("Work order {order_id} does not exist.")
    } else {
        err.into()
    }
}
