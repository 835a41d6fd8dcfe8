//! Repository for the `products` and `presentations` tables.

use sqlx::PgPool;

use comanda_core::types::DbId;

use crate::models::product::{Presentation, Product};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

const PRODUCT_COLUMNS: &str = "\
    id, business_id, category_id, retailer_id, name, description, price, \
    currency, active, available, out_of_stock, image_url, created_at, \
    updated_at";

const PRESENTATION_COLUMNS: &str =
    "id, product_id, name, price, active, created_at, updated_at";

/// Provides CRUD operations for products and their presentations.
pub struct ProductRepo;

impl ProductRepo {
    // -----------------------------------------------------------------------
    // Product CRUD
    // -----------------------------------------------------------------------

    /// Create a product. `retailer_id` is fixed at creation and never
    /// updated afterwards.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        business_id: DbId,
        category_id: Option<DbId>,
        retailer_id: &str,
        name: &str,
        description: Option<&str>,
        price: f64,
        currency: &str,
        image_url: Option<&str>,
    ) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products \
                 (business_id, category_id, retailer_id, name, description, price, currency, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(business_id)
            .bind(category_id)
            .bind(retailer_id)
            .bind(name)
            .bind(description)
            .bind(price)
            .bind(currency)
            .bind(image_url)
            .fetch_one(pool)
            .await
    }

    /// Find a product scoped to its tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        business_id: DbId,
        id: DbId,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query =
            format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE business_id = $1 AND id = $2");
        sqlx::query_as::<_, Product>(&query)
            .bind(business_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all of a tenant's products, newest first.
    pub async fn list(pool: &PgPool, business_id: DbId) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE business_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(business_id)
            .fetch_all(pool)
            .await
    }

    /// List active products, optionally scoped to one category.
    ///
    /// This is the batch-sync input set.
    pub async fn list_active(
        pool: &PgPool,
        business_id: DbId,
        category_id: Option<DbId>,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE business_id = $1 AND active = TRUE \
               AND ($2::bigint IS NULL OR category_id = $2) \
             ORDER BY id"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(business_id)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Partially update a product.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        pool: &PgPool,
        business_id: DbId,
        id: DbId,
        category_id: Option<DbId>,
        name: Option<&str>,
        description: Option<&str>,
        price: Option<f64>,
        active: Option<bool>,
        available: Option<bool>,
        out_of_stock: Option<bool>,
        image_url: Option<&str>,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET \
                 category_id = COALESCE($3, category_id), \
                 name = COALESCE($4, name), \
                 description = COALESCE($5, description), \
                 price = COALESCE($6, price), \
                 active = COALESCE($7, active), \
                 available = COALESCE($8, available), \
                 out_of_stock = COALESCE($9, out_of_stock), \
                 image_url = COALESCE($10, image_url), \
                 updated_at = NOW() \
             WHERE business_id = $1 AND id = $2 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(business_id)
            .bind(id)
            .bind(category_id)
            .bind(name)
            .bind(description)
            .bind(price)
            .bind(active)
            .bind(available)
            .bind(out_of_stock)
            .bind(image_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a product. Cascade deletes its presentations.
    pub async fn delete(pool: &PgPool, business_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE business_id = $1 AND id = $2")
            .bind(business_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Presentations
    // -----------------------------------------------------------------------

    /// List a product's presentations.
    pub async fn list_presentations(
        pool: &PgPool,
        product_id: DbId,
    ) -> Result<Vec<Presentation>, sqlx::Error> {
        let query = format!(
            "SELECT {PRESENTATION_COLUMNS} FROM presentations \
             WHERE product_id = $1 ORDER BY price"
        );
        sqlx::query_as::<_, Presentation>(&query)
            .bind(product_id)
            .fetch_all(pool)
            .await
    }

    /// Add a presentation to a product.
    pub async fn create_presentation(
        pool: &PgPool,
        product_id: DbId,
        name: &str,
        price: f64,
    ) -> Result<Presentation, sqlx::Error> {
        let query = format!(
            "INSERT INTO presentations (product_id, name, price) VALUES ($1, $2, $3) \
             RETURNING {PRESENTATION_COLUMNS}"
        );
        sqlx::query_as::<_, Presentation>(&query)
            .bind(product_id)
            .bind(name)
            .bind(price)
            .fetch_one(pool)
            .await
    }
}
