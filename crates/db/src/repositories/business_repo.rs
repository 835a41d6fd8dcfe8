//! Repository for the `businesses` and `locations` tables.
//!
//! Credential-bearing columns are updated with targeted partial
//! UPDATEs, never full-row rewrites, so concurrent writers (token
//! refresh vs. owner-id caching) cannot clobber each other.

use sqlx::PgPool;

use comanda_core::types::{DbId, Timestamp};

use crate::models::business::{Business, Location};

// ---------------------------------------------------------------------------
// Column list
// ---------------------------------------------------------------------------

const BUSINESS_COLUMNS: &str = "\
    id, subdomain, name, waba_id, phone_number_id, access_token_enc, \
    refresh_token_enc, token_expires_at, catalog_owner_id, catalog_ids, \
    category_catalog_map, sync_enabled, sync_mode, last_synced_at, \
    created_at, updated_at";

const LOCATION_COLUMNS: &str =
    "id, business_id, external_id, name, created_at, updated_at";

/// Provides lookups and partial updates for tenant credential records.
pub struct BusinessRepo;

impl BusinessRepo {
    // -----------------------------------------------------------------------
    // Resolution lookups
    // -----------------------------------------------------------------------

    /// Find a tenant directly by subdomain.
    pub async fn find_by_subdomain(
        pool: &PgPool,
        subdomain: &str,
    ) -> Result<Option<Business>, sqlx::Error> {
        let query = format!("SELECT {BUSINESS_COLUMNS} FROM businesses WHERE subdomain = $1");
        sqlx::query_as::<_, Business>(&query)
            .bind(subdomain)
            .fetch_optional(pool)
            .await
    }

    /// Find a tenant through the location indirection.
    pub async fn find_by_location(
        pool: &PgPool,
        location_external_id: &str,
    ) -> Result<Option<Business>, sqlx::Error> {
        let query = format!(
            "SELECT b.{} FROM businesses b \
             JOIN locations l ON l.business_id = b.id \
             WHERE l.external_id = $1",
            BUSINESS_COLUMNS.replace(", ", ", b."),
        );
        sqlx::query_as::<_, Business>(&query)
            .bind(location_external_id)
            .fetch_optional(pool)
            .await
    }

    /// Attribute a webhook entry to a tenant by its external account ids.
    ///
    /// Matches either the messaging-account (WABA) id or the platform
    /// phone-number id.
    pub async fn find_by_account_ids(
        pool: &PgPool,
        waba_id: &str,
        phone_number_id: Option<&str>,
    ) -> Result<Option<Business>, sqlx::Error> {
        let query = format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses \
             WHERE waba_id = $1 OR ($2::text IS NOT NULL AND phone_number_id = $2) \
             LIMIT 1"
        );
        sqlx::query_as::<_, Business>(&query)
            .bind(waba_id)
            .bind(phone_number_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a tenant by primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Business>, sqlx::Error> {
        let query = format!("SELECT {BUSINESS_COLUMNS} FROM businesses WHERE id = $1");
        sqlx::query_as::<_, Business>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Create a tenant record.
    pub async fn create(
        pool: &PgPool,
        subdomain: &str,
        name: &str,
    ) -> Result<Business, sqlx::Error> {
        let query = format!(
            "INSERT INTO businesses (subdomain, name) VALUES ($1, $2) \
             RETURNING {BUSINESS_COLUMNS}"
        );
        sqlx::query_as::<_, Business>(&query)
            .bind(subdomain)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Credential updates (partial, race-safe)
    // -----------------------------------------------------------------------

    /// Store vault-encrypted tokens and the external account ids.
    ///
    /// `access_token_enc` / `refresh_token_enc` must already be vault
    /// ciphertext; this method never encrypts.
    pub async fn link_account(
        pool: &PgPool,
        id: DbId,
        waba_id: &str,
        phone_number_id: Option<&str>,
        access_token_enc: &str,
        refresh_token_enc: Option<&str>,
        token_expires_at: Option<Timestamp>,
    ) -> Result<Option<Business>, sqlx::Error> {
        let query = format!(
            "UPDATE businesses SET \
                 waba_id = $2, \
                 phone_number_id = COALESCE($3, phone_number_id), \
                 access_token_enc = $4, \
                 refresh_token_enc = COALESCE($5, refresh_token_enc), \
                 token_expires_at = $6, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {BUSINESS_COLUMNS}"
        );
        sqlx::query_as::<_, Business>(&query)
            .bind(id)
            .bind(waba_id)
            .bind(phone_number_id)
            .bind(access_token_enc)
            .bind(refresh_token_enc)
            .bind(token_expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Cache the catalog-owner id, compare-and-set style.
    ///
    /// Only writes when the column is still NULL. Returns `true` when
    /// this caller won the race; a `false` means another writer already
    /// populated it and the caller should re-read.
    pub async fn set_catalog_owner_id_if_absent(
        pool: &PgPool,
        id: DbId,
        owner_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE businesses SET catalog_owner_id = $2, updated_at = NOW() \
             WHERE id = $1 AND catalog_owner_id IS NULL",
        )
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append a catalog id to the tenant's list, if not already present.
    pub async fn add_catalog_id(
        pool: &PgPool,
        id: DbId,
        catalog_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE businesses SET \
                 catalog_ids = CASE \
                     WHEN catalog_ids @> to_jsonb($2::text) THEN catalog_ids \
                     ELSE catalog_ids || to_jsonb($2::text) \
                 END, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(catalog_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a category -> catalog mapping without rewriting the map.
    pub async fn set_category_catalog(
        pool: &PgPool,
        id: DbId,
        category_id: DbId,
        catalog_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE businesses SET \
                 category_catalog_map = category_catalog_map || \
                     jsonb_build_object($2::text, $3::text), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(category_id.to_string())
        .bind(catalog_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Update the sync schedule settings.
    pub async fn update_sync_settings(
        pool: &PgPool,
        id: DbId,
        sync_enabled: Option<bool>,
        sync_mode: Option<&str>,
    ) -> Result<Option<Business>, sqlx::Error> {
        let query = format!(
            "UPDATE businesses SET \
                 sync_enabled = COALESCE($2, sync_enabled), \
                 sync_mode = COALESCE($3, sync_mode), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {BUSINESS_COLUMNS}"
        );
        sqlx::query_as::<_, Business>(&query)
            .bind(id)
            .bind(sync_enabled)
            .bind(sync_mode)
            .fetch_optional(pool)
            .await
    }

    /// Stamp the last successful sync time.
    pub async fn touch_last_synced(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE businesses SET last_synced_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Locations
    // -----------------------------------------------------------------------

    /// List a tenant's locations.
    pub async fn list_locations(
        pool: &PgPool,
        business_id: DbId,
    ) -> Result<Vec<Location>, sqlx::Error> {
        let query = format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE business_id = $1 ORDER BY name"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(business_id)
            .fetch_all(pool)
            .await
    }
}
