//! Tenant resolution: from a tenant key to a decrypted credential
//! context.
//!
//! A tenant key is a subdomain plus an optional location id. When a
//! location id is present it wins: the location row points at its
//! owning business. The access token is decrypted on read through the
//! vault; a failed decryption is a hard error unless the stored value
//! cannot possibly be ciphertext *and* the legacy-plaintext flag is on.

use sqlx::PgPool;

use comanda_core::types::DbId;
use comanda_core::vault::{Vault, VaultError};
use comanda_db::models::business::Business;
use comanda_db::repositories::BusinessRepo;

use crate::client::{CatalogApi, CatalogApiError};

/// Minimum length of a well-formed hex blob (IV + TAG).
const MIN_CIPHERTEXT_HEX_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Tenant resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// No tenant matches the given key.
    #[error("No business found for tenant key '{0}'")]
    NotFound(String),

    /// The stored token could not be decrypted and is not eligible for
    /// the legacy plaintext fallback.
    #[error("Credential decryption failed: {0}")]
    Decryption(#[from] VaultError),

    /// A required field (token, messaging-account id) is absent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The remote owner lookup failed.
    #[error(transparent)]
    Api(#[from] CatalogApiError),

    /// Database failure during resolution.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// Config / context
// ---------------------------------------------------------------------------

/// Resolver behaviour switches.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// Accept plaintext-looking stored tokens from the pre-vault
    /// migration window. Off by default; every hit is WARN-logged and
    /// the resolved context is marked degraded.
    pub legacy_plaintext_tokens: bool,
}

/// A resolved tenant: the credential record plus its decrypted token.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub business: Business,
    /// Decrypted access token. Never logged.
    pub access_token: String,
    /// True when the token came through the legacy plaintext fallback.
    pub degraded: bool,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve a tenant key to a credential context.
///
/// Precedence: location indirection first when a location id is given,
/// otherwise direct subdomain lookup.
pub async fn resolve(
    pool: &PgPool,
    vault: &Vault,
    config: &ResolverConfig,
    subdomain: &str,
    location_id: Option<&str>,
) -> Result<TenantContext, ResolverError> {
    let business = match location_id {
        Some(loc) => BusinessRepo::find_by_location(pool, loc).await?,
        None => BusinessRepo::find_by_subdomain(pool, subdomain).await?,
    }
    .ok_or_else(|| ResolverError::NotFound(subdomain.to_string()))?;

    let stored = business
        .access_token_enc
        .clone()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ResolverError::Configuration(format!(
                "business '{}' has no access token",
                business.subdomain
            ))
        })?;

    match vault.decrypt(&stored) {
        Ok(token) => Ok(TenantContext {
            business,
            access_token: token,
            degraded: false,
        }),
        Err(err) if config.legacy_plaintext_tokens && !plausible_ciphertext(&stored) => {
            // Pre-vault records stored the token as-is. Tolerated only
            // behind the flag, and loudly.
            tracing::warn!(
                business_id = business.id,
                subdomain = %business.subdomain,
                reason = %err,
                "Using legacy plaintext token; credential should be re-encrypted",
            );
            Ok(TenantContext {
                business,
                access_token: stored,
                degraded: true,
            })
        }
        Err(err) => {
            tracing::error!(
                business_id = business.id,
                subdomain = %business.subdomain,
                reason = %err,
                "Credential decryption failed",
            );
            Err(err.into())
        }
    }
}

/// Whether a stored value is shaped like a vault blob.
///
/// The at-rest encoding is hex with a 32-byte minimum, so anything
/// short or non-hex cannot be ciphertext. Values that *do* look like
/// ciphertext never take the plaintext fallback.
fn plausible_ciphertext(value: &str) -> bool {
    value.len() >= MIN_CIPHERTEXT_HEX_LEN
        && value.len() % 2 == 0
        && value.bytes().all(|b| b.is_ascii_hexdigit())
}

// ---------------------------------------------------------------------------
// Catalog owner id
// ---------------------------------------------------------------------------

/// Return the tenant's catalog-owner id, fetching and caching it on
/// first use.
///
/// The cache write is compare-and-set; losing the race costs one
/// redundant remote lookup and the winner's value is returned.
pub async fn ensure_catalog_owner_id<A: CatalogApi + ?Sized>(
    pool: &PgPool,
    api: &A,
    ctx: &TenantContext,
) -> Result<String, ResolverError> {
    if let Some(owner) = &ctx.business.catalog_owner_id {
        return Ok(owner.clone());
    }

    let waba_id = ctx.business.waba_id.as_deref().ok_or_else(|| {
        ResolverError::Configuration(format!(
            "business '{}' has no messaging account id",
            ctx.business.subdomain
        ))
    })?;
    if ctx.access_token.is_empty() {
        return Err(ResolverError::Configuration(format!(
            "business '{}' has no access token",
            ctx.business.subdomain
        )));
    }

    let owner_id = api
        .lookup_owner(&ctx.access_token, waba_id)
        .await?
        .ok_or_else(|| {
            ResolverError::Configuration(format!(
                "messaging account {waba_id} has no owning business entity"
            ))
        })?;

    let won = BusinessRepo::set_catalog_owner_id_if_absent(pool, ctx.business.id, &owner_id).await?;
    if won {
        tracing::info!(
            business_id = ctx.business.id,
            owner_id = %owner_id,
            "Cached catalog owner id",
        );
        return Ok(owner_id);
    }

    // Another writer populated the cache first; use their value.
    let current = BusinessRepo::find_by_id(pool, ctx.business.id)
        .await?
        .and_then(|b| b.catalog_owner_id);
    Ok(current.unwrap_or(owner_id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Ciphertext heuristic ----------------------------------------------

    #[test]
    fn hex_blob_of_minimum_length_is_plausible() {
        assert!(plausible_ciphertext(&"ab".repeat(32)));
    }

    #[test]
    fn short_value_is_not_plausible() {
        assert!(!plausible_ciphertext("abcdef"));
    }

    #[test]
    fn non_hex_value_is_not_plausible() {
        // Long enough, but platform tokens are not hex.
        let token = "EAAGxyz".repeat(20);
        assert!(!plausible_ciphertext(&token));
    }

    #[test]
    fn odd_length_hex_is_not_plausible() {
        assert!(!plausible_ciphertext(&"a".repeat(65)));
    }

    // -- Error display -----------------------------------------------------

    #[test]
    fn not_found_names_the_tenant_key() {
        let err = ResolverError::NotFound("tacos-don-jose".into());
        assert!(err.to_string().contains("tacos-don-jose"));
    }
}
