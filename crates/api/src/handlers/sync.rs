//! Explicit catalog sync endpoints.
//!
//! These are the manual-mode counterpart to the detached pushes fired
//! by product CRUD: full-menu batch, per-category batch, category
//! catalog provisioning, and a status read.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use comanda_catalog::resolver::{self, TenantContext};
use comanda_catalog::sync::{BatchSyncResult, ProvisionResult};
use comanda_core::error::CoreError;
use comanda_core::types::DbId;
use comanda_db::models::product::{Presentation, Product};
use comanda_db::repositories::{BusinessRepo, CategoryRepo, ProductRepo};

use crate::error::AppResult;
use crate::handlers::require_business;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Batch sync
// ---------------------------------------------------------------------------

/// POST /api/v1/t/{subdomain}/sync/products
///
/// Push all active products as one batch submission.
pub async fn sync_products(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> AppResult<Json<DataResponse<BatchSyncResult>>> {
    let ctx = tenant_context(&state, &subdomain).await?;
    let items = load_batch_items(&state, ctx.business.id, None).await?;

    let result = state.engine.sync_batch(&ctx, &items, None).await;
    if result.synced > 0 {
        BusinessRepo::touch_last_synced(&state.pool, ctx.business.id).await?;
    }
    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/t/{subdomain}/sync/categories/{id}
///
/// Push one category's active products; the batch targets the
/// category's mapped catalog and includes price-range annotations.
pub async fn sync_category(
    State(state): State<AppState>,
    Path((subdomain, category_id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<BatchSyncResult>>> {
    let ctx = tenant_context(&state, &subdomain).await?;
    CategoryRepo::find_by_id(&state.pool, ctx.business.id, category_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Category",
            id: category_id.to_string(),
        })?;
    let items = load_batch_items(&state, ctx.business.id, Some(category_id)).await?;

    let result = state.engine.sync_batch(&ctx, &items, Some(category_id)).await;
    if result.synced > 0 {
        BusinessRepo::touch_last_synced(&state.pool, ctx.business.id).await?;
    }
    Ok(Json(DataResponse { data: result }))
}

// ---------------------------------------------------------------------------
// Provisioning
// ---------------------------------------------------------------------------

/// POST /api/v1/t/{subdomain}/sync/catalogs/provision
///
/// Create one external catalog per active, unmapped category and
/// persist the resulting mappings. Partial success is reported, not
/// rolled back.
pub async fn provision_catalogs(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> AppResult<Json<DataResponse<ProvisionResult>>> {
    let ctx = tenant_context(&state, &subdomain).await?;
    let owner_id = resolver::ensure_catalog_owner_id(&state.pool, state.engine.api(), &ctx).await?;
    let categories = CategoryRepo::list_active(&state.pool, ctx.business.id).await?;

    let result = state
        .engine
        .provision_category_catalogs(&ctx, &owner_id, &categories)
        .await;

    for mapping in &result.created {
        BusinessRepo::set_category_catalog(
            &state.pool,
            ctx.business.id,
            mapping.category_id,
            &mapping.catalog_id,
        )
        .await?;
    }
    Ok(Json(DataResponse { data: result }))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Sync bookkeeping snapshot for one tenant.
#[derive(Debug, Serialize)]
pub struct SyncStatus {
    pub sync_enabled: bool,
    pub sync_mode: String,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub catalog_configured: bool,
    pub category_catalogs: usize,
}

/// GET /api/v1/t/{subdomain}/sync/status
pub async fn status(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> AppResult<Json<DataResponse<SyncStatus>>> {
    let business = require_business(&state, &subdomain).await?;
    let status = SyncStatus {
        sync_enabled: business.sync_enabled,
        sync_mode: business.sync_mode.clone(),
        last_synced_at: business.last_synced_at,
        catalog_configured: business.primary_catalog_id().is_some(),
        category_catalogs: business
            .category_catalog_map
            .as_object()
            .map_or(0, |m| m.len()),
    };
    Ok(Json(DataResponse { data: status }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn tenant_context(state: &AppState, subdomain: &str) -> AppResult<TenantContext> {
    resolver::resolve(
        &state.pool,
        &state.vault,
        &state.config.resolver_config(),
        subdomain,
        None,
    )
    .await
    .map_err(Into::into)
}

/// Load the batch input set: active products plus their presentations.
async fn load_batch_items(
    state: &AppState,
    business_id: DbId,
    category_id: Option<DbId>,
) -> AppResult<Vec<(Product, Vec<Presentation>)>> {
    let products = ProductRepo::list_active(&state.pool, business_id, category_id).await?;
    let mut items = Vec::with_capacity(products.len());
    for product in products {
        let presentations = ProductRepo::list_presentations(&state.pool, product.id).await?;
        items.push((product, presentations));
    }
    Ok(items)
}
