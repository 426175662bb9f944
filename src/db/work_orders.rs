use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::WorkOrder;

const ORDER_COLUMNS: &str = "id, device_id, status, create_time, priority, handler";

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<WorkOrder> {
    Ok(WorkOrder {
        id: row.get(0)?,
        device_id: row.get(1)?,
        status: row.get(2)?,
        create_time: row.get(3)?,
        // Rows written by hand may leave priority NULL despite the default.
        priority: row.get::<_, Option<i64>>(4)?.unwrap_or(1),
        handler: row.get(5)?,
    })
}

/// Insert a work order. A duplicate id comes back as a readable error.
pub fn create_work_order(conn: &Connection, order: &WorkOrder) -> Result<()> {
    conn.execute(
        "INSERT INTO work_orders (id, device_id, status, create_time, priority, handler)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            order.id,
            order.device_id,
            order.status,
            order.create_time,
            order.priority,
            order.handler
        ],
    )
    .map_err(|err| {
        if matches!(
            err.sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        ) {
            anyhow!("Work order {} already exists.", order.id)
        } else {
            err.into()
        }
    })
    .context("failed to insert work order")?;

    Ok(())
}

pub fn fetch_work_order(conn: &Connection, id: &str) -> Result<Option<WorkOrder>> {
    conn.query_row(
        &format!("SELECT {ORDER_COLUMNS} FROM work_orders WHERE id = ?1"),
        [id],
        order_from_row,
    )
    .optional()
    .context("failed to load work order")
}

/// Orders for one device in one status, newest first. This is the lookup the
/// `(device_id, status)` index exists for.
pub fn fetch_orders_for_device(
    conn: &Connection,
    device_id: &str,
    status: &str,
) -> Result<Vec<WorkOrder>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ORDER_COLUMNS} FROM work_orders
             WHERE device_id = ?1 AND status = ?2
             ORDER BY create_time DESC, id"
        ))
        .context("failed to prepare device orders query")?;

    let orders = stmt
        .query_map([device_id, status], order_from_row)
        .context("failed to load device orders")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect device orders")?;

    Ok(orders)
}

pub fn assign_handler(conn: &Connection, id: &str, handler: Option<&str>) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE work_orders SET handler = ?1 WHERE id = ?2",
            params![handler, id],
        )
        .context("failed to update work order handler")?;

    if updated == 0 {
        Err(anyhow!("Work order not found"))
    } else {
        Ok(())
    }
}

/// Remove a work order. The schema cascades to `operation_logs`.
pub fn delete_work_order(conn: &Connection, id: &str) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM work_orders WHERE id = ?1", [id])
        .context("failed to delete work order")?;

    if deleted == 0 {
        Err(anyhow!("Work order not found"))
    } else {
        Ok(())
    }
}
