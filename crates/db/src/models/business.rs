//! Tenant (business) credential records and locations.
//!
//! A business is one restaurant tenant, identified by its subdomain.
//! Token fields hold **vault ciphertext only**; all writes to them must
//! go through the credential vault before reaching a repository. The
//! `#[serde(skip_serializing)]` markers keep even the ciphertext out of
//! API responses.

use comanda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog sync schedule modes, matching the `sync_mode` column values.
pub mod sync_mode {
    pub const MANUAL: &str = "manual";
    pub const REALTIME: &str = "realtime";
    pub const DAILY: &str = "daily";
}

// ---------------------------------------------------------------------------
// Business
// ---------------------------------------------------------------------------

/// A row from the `businesses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Business {
    pub id: DbId,
    /// Tenant key; unique.
    pub subdomain: String,
    pub name: String,
    /// Messaging-account id on the external platform (WABA id).
    pub waba_id: Option<String>,
    /// The platform's phone-number id (not the phone number).
    pub phone_number_id: Option<String>,
    /// Vault ciphertext of the long-lived access token.
    #[serde(skip_serializing)]
    pub access_token_enc: Option<String>,
    /// Vault ciphertext of the refresh token, when the platform issues one.
    #[serde(skip_serializing)]
    pub refresh_token_enc: Option<String>,
    pub token_expires_at: Option<Timestamp>,
    /// External business-entity id owning the commerce catalogs.
    /// Resolved lazily and cached; cleared only by an explicit migration.
    pub catalog_owner_id: Option<String>,
    /// JSON array of external catalog ids; the first is the primary.
    pub catalog_ids: serde_json::Value,
    /// JSON object mapping internal category id -> external catalog id.
    pub category_catalog_map: serde_json::Value,
    pub sync_enabled: bool,
    pub sync_mode: String,
    pub last_synced_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Business {
    /// The tenant's primary external catalog id, if any is configured.
    pub fn primary_catalog_id(&self) -> Option<&str> {
        self.catalog_ids.as_array()?.first()?.as_str()
    }

    /// The catalog id mapped to a specific category, if one exists.
    pub fn category_catalog_id(&self, category_id: DbId) -> Option<&str> {
        self.category_catalog_map
            .as_object()?
            .get(&category_id.to_string())?
            .as_str()
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A row from the `locations` table.
///
/// Locations provide the optional second half of the tenant key: a
/// location id resolves to its owning business first.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Location {
    pub id: DbId,
    pub business_id: DbId,
    /// External-facing location key used in tenant resolution.
    pub external_id: String,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Request body for linking a tenant to the external platform.
///
/// Tokens arrive in plaintext over TLS and are sealed by the vault
/// before they are stored.
#[derive(Debug, Deserialize)]
pub struct LinkAccountRequest {
    pub waba_id: String,
    pub phone_number_id: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<Timestamp>,
}

/// Request body for updating sync settings.
#[derive(Debug, Deserialize)]
pub struct UpdateSyncSettings {
    pub sync_enabled: Option<bool>,
    pub sync_mode: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn business_with(catalog_ids: serde_json::Value, map: serde_json::Value) -> Business {
        Business {
            id: 1,
            subdomain: "tacos-don-jose".into(),
            name: "Tacos Don José".into(),
            waba_id: Some("waba-100".into()),
            phone_number_id: Some("phone-55".into()),
            access_token_enc: None,
            refresh_token_enc: None,
            token_expires_at: None,
            catalog_owner_id: None,
            catalog_ids,
            category_catalog_map: map,
            sync_enabled: true,
            sync_mode: sync_mode::REALTIME.into(),
            last_synced_at: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn primary_catalog_id_is_first_entry() {
        let b = business_with(serde_json::json!(["cat-1", "cat-2"]), serde_json::json!({}));
        assert_eq!(b.primary_catalog_id(), Some("cat-1"));
    }

    #[test]
    fn primary_catalog_id_none_when_empty() {
        let b = business_with(serde_json::json!([]), serde_json::json!({}));
        assert_eq!(b.primary_catalog_id(), None);
    }

    #[test]
    fn category_catalog_id_looks_up_by_string_key() {
        let b = business_with(
            serde_json::json!([]),
            serde_json::json!({"42": "cat-drinks"}),
        );
        assert_eq!(b.category_catalog_id(42), Some("cat-drinks"));
        assert_eq!(b.category_catalog_id(7), None);
    }

    #[test]
    fn token_ciphertext_never_serializes() {
        let mut b = business_with(serde_json::json!([]), serde_json::json!({}));
        b.access_token_enc = Some("deadbeef".into());
        let json = serde_json::to_string(&b).unwrap();
        assert!(!json.contains("deadbeef"));
        assert!(!json.contains("access_token_enc"));
    }
}
