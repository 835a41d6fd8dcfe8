//! Repository for the `categories` table.

use sqlx::PgPool;

use comanda_core::types::DbId;

use crate::models::category::Category;

const CATEGORY_COLUMNS: &str = "\
    id, business_id, name, description, active, sort_order, created_at, \
    updated_at";

/// Provides CRUD operations for menu categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Create a category.
    pub async fn create(
        pool: &PgPool,
        business_id: DbId,
        name: &str,
        description: Option<&str>,
        sort_order: i32,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (business_id, name, description, sort_order) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(business_id)
            .bind(name)
            .bind(description)
            .bind(sort_order)
            .fetch_one(pool)
            .await
    }

    /// Find a category scoped to its tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        business_id: DbId,
        id: DbId,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query =
            format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE business_id = $1 AND id = $2");
        sqlx::query_as::<_, Category>(&query)
            .bind(business_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a tenant's categories in display order.
    pub async fn list(pool: &PgPool, business_id: DbId) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE business_id = $1 \
             ORDER BY sort_order, name"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(business_id)
            .fetch_all(pool)
            .await
    }

    /// List only active categories (the catalog-provisioning input set).
    pub async fn list_active(
        pool: &PgPool,
        business_id: DbId,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE business_id = $1 AND active = TRUE \
             ORDER BY sort_order, name"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(business_id)
            .fetch_all(pool)
            .await
    }

    /// Partially update a category.
    pub async fn update(
        pool: &PgPool,
        business_id: DbId,
        id: DbId,
        name: Option<&str>,
        description: Option<&str>,
        active: Option<bool>,
        sort_order: Option<i32>,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET \
                 name = COALESCE($3, name), \
                 description = COALESCE($4, description), \
                 active = COALESCE($5, active), \
                 sort_order = COALESCE($6, sort_order), \
                 updated_at = NOW() \
             WHERE business_id = $1 AND id = $2 \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(business_id)
            .bind(id)
            .bind(name)
            .bind(description)
            .bind(active)
            .bind(sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category. Products keep their rows with a NULLed
    /// category reference.
    pub async fn delete(pool: &PgPool, business_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE business_id = $1 AND id = $2")
            .bind(business_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
