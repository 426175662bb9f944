//! Domain models that mirror the SQLite schema. They stay plain data holders
//! so the persistence helpers own every query.

/// A unit of field work tied to a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrder {
    /// Caller-assigned primary key.
    pub id: String,
    pub device_id: String,
    /// Free-form status. The schema does not restrict the values.
    pub status: String,
    /// ISO-8601-ish timestamp kept as text, exactly as stored.
    pub create_time: String,
    /// Defaults to 1 when the row is inserted without one.
    pub priority: i64,
    /// Person handling the order. Added by the v2 migration, so rows
    /// created under v1 read back as `None`.
    pub handler: Option<String>,
}

impl WorkOrder {
    /// Build an order with the schema defaults for `priority` and `handler`.
    pub fn new(id: &str, device_id: &str, status: &str, create_time: &str) -> Self {
        Self {
            id: id.to_string(),
            device_id: device_id.to_string(),
            status: status.to_string(),
            create_time: create_time.to_string(),
            priority: 1,
            handler: None,
        }
    }
}

/// Append-only audit record for a work order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationLog {
    /// Auto-increment key assigned by SQLite.
    pub id: i64,
    pub order_id: String,
    pub action: String,
    pub operator: String,
    pub time: String,
}
