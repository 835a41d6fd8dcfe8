//! Tenant account handlers: creation, platform linking, catalog
//! registration, sync settings.
//!
//! Plaintext tokens exist only inside the link handler; they are sealed
//! by the vault before any repository call (values that are already
//! sealed pass through unchanged), and responses never include token
//! fields (the model skips them during serialization).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use comanda_core::error::CoreError;
use comanda_core::vault::{Vault, VaultError};
use comanda_db::models::business::{sync_mode, Business, LinkAccountRequest, UpdateSyncSettings};
use comanda_db::repositories::BusinessRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::require_business;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Request body for creating a tenant.
#[derive(Debug, Deserialize)]
pub struct CreateBusiness {
    pub subdomain: String,
    pub name: String,
}

/// POST /api/v1/businesses
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateBusiness>,
) -> AppResult<(StatusCode, Json<DataResponse<Business>>)> {
    if input.subdomain.is_empty()
        || !input
            .subdomain
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Err(AppError::BadRequest(
            "subdomain must be lowercase alphanumeric with hyphens".into(),
        ));
    }
    let business = BusinessRepo::create(&state.pool, &input.subdomain, &input.name).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: business })))
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// GET /api/v1/t/{subdomain}/account
pub async fn get_account(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> AppResult<Json<DataResponse<Business>>> {
    let business = require_business(&state, &subdomain).await?;
    Ok(Json(DataResponse { data: business }))
}

/// POST /api/v1/t/{subdomain}/account/link
///
/// Stores the external account ids and the vault-sealed tokens.
pub async fn link_account(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
    Json(input): Json<LinkAccountRequest>,
) -> AppResult<Json<DataResponse<Business>>> {
    if input.access_token.is_empty() {
        return Err(AppError::BadRequest("access_token must not be empty".into()));
    }
    let business = require_business(&state, &subdomain).await?;

    let access_token_enc = seal_token(&state.vault, &input.access_token)?;
    let refresh_token_enc = input
        .refresh_token
        .as_deref()
        .map(|t| seal_token(&state.vault, t))
        .transpose()?;

    let updated = BusinessRepo::link_account(
        &state.pool,
        business.id,
        &input.waba_id,
        input.phone_number_id.as_deref(),
        &access_token_enc,
        refresh_token_enc.as_deref(),
        input.token_expires_at,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Business",
        id: subdomain,
    }))?;

    tracing::info!(business_id = updated.id, "Linked external account");
    Ok(Json(DataResponse { data: updated }))
}

/// Seal a token for storage, leaving already-sealed blobs untouched.
///
/// Clients replay the stored value on re-link; encrypting it again
/// would store a blob that no longer decrypts to the original token.
fn seal_token(vault: &Vault, token: &str) -> Result<String, VaultError> {
    if vault.is_encrypted(token) {
        Ok(token.to_string())
    } else {
        vault.encrypt(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_vault() -> Vault {
        Vault::new([7u8; 32])
    }

    #[test]
    fn seal_token_encrypts_plaintext() {
        let vault = test_vault();
        let sealed = seal_token(&vault, "EAAG-access-token").unwrap();
        assert_ne!(sealed, "EAAG-access-token");
        assert_eq!(vault.decrypt(&sealed).unwrap(), "EAAG-access-token");
    }

    #[test]
    fn seal_token_leaves_sealed_blobs_unchanged() {
        let vault = test_vault();
        let sealed = vault.encrypt("EAAG-access-token").unwrap();
        let resealed = seal_token(&vault, &sealed).unwrap();
        assert_eq!(resealed, sealed);
        assert_eq!(vault.decrypt(&resealed).unwrap(), "EAAG-access-token");
    }
}

// ---------------------------------------------------------------------------
// Catalogs
// ---------------------------------------------------------------------------

/// Request body for registering an existing external catalog.
#[derive(Debug, Deserialize)]
pub struct RegisterCatalog {
    pub catalog_id: String,
}

/// POST /api/v1/t/{subdomain}/account/catalogs
///
/// Appends a catalog id to the tenant's list; the first registered
/// catalog becomes the primary.
pub async fn register_catalog(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
    Json(input): Json<RegisterCatalog>,
) -> AppResult<Json<DataResponse<Business>>> {
    if input.catalog_id.is_empty() {
        return Err(AppError::BadRequest("catalog_id must not be empty".into()));
    }
    let business = require_business(&state, &subdomain).await?;
    BusinessRepo::add_catalog_id(&state.pool, business.id, &input.catalog_id).await?;

    let updated = require_business(&state, &subdomain).await?;
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Sync settings
// ---------------------------------------------------------------------------

/// PUT /api/v1/t/{subdomain}/account/sync-settings
pub async fn update_sync_settings(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
    Json(input): Json<UpdateSyncSettings>,
) -> AppResult<Json<DataResponse<Business>>> {
    if let Some(mode) = input.sync_mode.as_deref() {
        if !matches!(mode, sync_mode::MANUAL | sync_mode::REALTIME | sync_mode::DAILY) {
            return Err(AppError::BadRequest(format!("unknown sync mode '{mode}'")));
        }
    }
    let business = require_business(&state, &subdomain).await?;
    let updated = BusinessRepo::update_sync_settings(
        &state.pool,
        business.id,
        input.sync_enabled,
        input.sync_mode.as_deref(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Business",
        id: subdomain,
    }))?;
    Ok(Json(DataResponse { data: updated }))
}
