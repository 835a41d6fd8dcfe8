//! Handlers for the tenant-scoped `/products` resource.
//!
//! Writes are acknowledged from Postgres immediately; the external
//! catalog push runs in a detached task (realtime sync mode only).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use comanda_core::error::CoreError;
use comanda_core::types::DbId;
use comanda_db::models::product::{CreateProduct, Presentation, Product, UpdateProduct};
use comanda_db::repositories::ProductRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::{require_business, spawn_product_push, PushKind};
use crate::response::DataResponse;
use crate::state::AppState;

/// Default currency for tenants that do not specify one.
const DEFAULT_CURRENCY: &str = "MXN";

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/t/{subdomain}/products
pub async fn create(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
    Json(input): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<DataResponse<Product>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let business = require_business(&state, &subdomain).await?;

    let retailer_id = input
        .retailer_id
        .clone()
        .unwrap_or_else(|| generate_retailer_id(&input.name));
    let currency = input.currency.as_deref().unwrap_or(DEFAULT_CURRENCY);

    let product = ProductRepo::create(
        &state.pool,
        business.id,
        input.category_id,
        &retailer_id,
        &input.name,
        input.description.as_deref(),
        input.price,
        currency,
        input.image_url.as_deref(),
    )
    .await?;

    spawn_product_push(&state, &business, product.clone(), PushKind::Full);
    Ok((StatusCode::CREATED, Json(DataResponse { data: product })))
}

/// GET /api/v1/t/{subdomain}/products
pub async fn list(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> AppResult<Json<DataResponse<Vec<Product>>>> {
    let business = require_business(&state, &subdomain).await?;
    let products = ProductRepo::list(&state.pool, business.id).await?;
    Ok(Json(DataResponse { data: products }))
}

/// GET /api/v1/t/{subdomain}/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<Product>>> {
    let business = require_business(&state, &subdomain).await?;
    let product = ProductRepo::find_by_id(&state.pool, business.id, id)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(DataResponse { data: product }))
}

/// PUT /api/v1/t/{subdomain}/products/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
    Json(input): Json<UpdateProduct>,
) -> AppResult<Json<DataResponse<Product>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let business = require_business(&state, &subdomain).await?;

    let product = ProductRepo::update(
        &state.pool,
        business.id,
        id,
        input.category_id,
        input.name.as_deref(),
        input.description.as_deref(),
        input.price,
        input.active,
        input.available,
        input.out_of_stock,
        input.image_url.as_deref(),
    )
    .await?
    .ok_or(not_found(id))?;

    spawn_product_push(&state, &business, product.clone(), PushKind::Full);
    Ok(Json(DataResponse { data: product }))
}

/// DELETE /api/v1/t/{subdomain}/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
) -> AppResult<StatusCode> {
    let business = require_business(&state, &subdomain).await?;

    // The row is gone after the delete, so snapshot it first for the
    // external removal.
    let product = ProductRepo::find_by_id(&state.pool, business.id, id)
        .await?
        .ok_or(not_found(id))?;
    let deleted = ProductRepo::delete(&state.pool, business.id, id).await?;
    if !deleted {
        return Err(not_found(id).into());
    }

    spawn_product_push(&state, &business, product, PushKind::Delete);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// Request body for the availability toggle.
#[derive(Debug, Deserialize)]
pub struct AvailabilityUpdate {
    pub available: Option<bool>,
    pub out_of_stock: Option<bool>,
}

/// PATCH /api/v1/t/{subdomain}/products/{id}/availability
///
/// Stock-toggle fast path: updates only the availability flags and
/// pushes a minimal availability payload instead of the full product.
pub async fn set_availability(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
    Json(input): Json<AvailabilityUpdate>,
) -> AppResult<Json<DataResponse<Product>>> {
    let business = require_business(&state, &subdomain).await?;

    let product = ProductRepo::update(
        &state.pool,
        business.id,
        id,
        None,
        None,
        None,
        None,
        None,
        input.available,
        input.out_of_stock,
        None,
    )
    .await?
    .ok_or(not_found(id))?;

    spawn_product_push(&state, &business, product.clone(), PushKind::Availability);
    Ok(Json(DataResponse { data: product }))
}

// ---------------------------------------------------------------------------
// Presentations
// ---------------------------------------------------------------------------

/// Request body for adding a presentation.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePresentation {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
}

/// GET /api/v1/t/{subdomain}/products/{id}/presentations
pub async fn list_presentations(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<Vec<Presentation>>>> {
    let business = require_business(&state, &subdomain).await?;
    // Scope check before reading presentations.
    ProductRepo::find_by_id(&state.pool, business.id, id)
        .await?
        .ok_or(not_found(id))?;
    let presentations = ProductRepo::list_presentations(&state.pool, id).await?;
    Ok(Json(DataResponse { data: presentations }))
}

/// POST /api/v1/t/{subdomain}/products/{id}/presentations
pub async fn create_presentation(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
    Json(input): Json<CreatePresentation>,
) -> AppResult<(StatusCode, Json<DataResponse<Presentation>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let business = require_business(&state, &subdomain).await?;

    let product = ProductRepo::find_by_id(&state.pool, business.id, id)
        .await?
        .ok_or(not_found(id))?;
    let presentation =
        ProductRepo::create_presentation(&state.pool, id, &input.name, input.price).await?;

    // A new variant changes the price range annotation.
    spawn_product_push(&state, &business, product, PushKind::Full);
    Ok((StatusCode::CREATED, Json(DataResponse { data: presentation })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Product",
        id: id.to_string(),
    }
}

/// Derive a retailer id from the product name plus a random suffix.
///
/// The id is immutable once created, so collisions within a tenant must
/// be practically impossible.
fn generate_retailer_id(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", slug, &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retailer_id_is_slugged_and_suffixed() {
        let id = generate_retailer_id("Tacos al Pastor");
        assert!(id.starts_with("tacos-al-pastor-"));
        assert_eq!(id.len(), "tacos-al-pastor-".len() + 8);
    }

    #[test]
    fn retailer_ids_are_unique_per_call() {
        assert_ne!(generate_retailer_id("Tacos"), generate_retailer_id("Tacos"));
    }
}
