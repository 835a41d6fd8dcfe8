//! Order models.
//!
//! Orders are plain per-tenant CRUD records here; lifecycle management
//! (kitchen states, delivery routing) is out of scope for this service.

use comanda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Order status values stored in the `status` column.
pub mod order_status {
    pub const PENDING: &str = "pending";
    pub const CONFIRMED: &str = "confirmed";
    pub const COMPLETED: &str = "completed";
    pub const CANCELLED: &str = "cancelled";
}

/// A row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub business_id: DbId,
    /// Customer contact; PII, never logged.
    pub customer_phone: Option<String>,
    /// JSON array of `{product_id, quantity, unit_price}` line items.
    pub items: serde_json::Value,
    pub total: f64,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for creating an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    pub customer_phone: Option<String>,
    pub items: serde_json::Value,
    pub total: f64,
}

/// Request body for updating an order's status.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: String,
}
