//! Repository for the `orders` table.

use sqlx::PgPool;

use comanda_core::types::DbId;

use crate::models::order::Order;

const ORDER_COLUMNS: &str = "\
    id, business_id, customer_phone, items, total, status, created_at, \
    updated_at";

/// Provides CRUD operations for orders.
pub struct OrderRepo;

impl OrderRepo {
    /// Create an order in the `pending` state.
    pub async fn create(
        pool: &PgPool,
        business_id: DbId,
        customer_phone: Option<&str>,
        items: &serde_json::Value,
        total: f64,
    ) -> Result<Order, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders (business_id, customer_phone, items, total) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ORDER_COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(business_id)
            .bind(customer_phone)
            .bind(items)
            .bind(total)
            .fetch_one(pool)
            .await
    }

    /// Find an order scoped to its tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        business_id: DbId,
        id: DbId,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE business_id = $1 AND id = $2");
        sqlx::query_as::<_, Order>(&query)
            .bind(business_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a tenant's orders, newest first.
    pub async fn list(pool: &PgPool, business_id: DbId) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE business_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(business_id)
            .fetch_all(pool)
            .await
    }

    /// Update an order's status.
    pub async fn update_status(
        pool: &PgPool,
        business_id: DbId,
        id: DbId,
        status: &str,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET status = $3, updated_at = NOW() \
             WHERE business_id = $1 AND id = $2 \
             RETURNING {ORDER_COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(business_id)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Delete an order.
    pub async fn delete(pool: &PgPool, business_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE business_id = $1 AND id = $2")
            .bind(business_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
