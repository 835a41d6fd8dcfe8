//! Handlers for the tenant-scoped `/categories` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use comanda_core::error::CoreError;
use comanda_core::types::DbId;
use comanda_db::models::category::{Category, CreateCategory, UpdateCategory};
use comanda_db::repositories::CategoryRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::require_business;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/t/{subdomain}/categories
pub async fn create(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let business = require_business(&state, &subdomain).await?;
    let category = CategoryRepo::create(
        &state.pool,
        business.id,
        &input.name,
        input.description.as_deref(),
        input.sort_order.unwrap_or(0),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// GET /api/v1/t/{subdomain}/categories
pub async fn list(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let business = require_business(&state, &subdomain).await?;
    let categories = CategoryRepo::list(&state.pool, business.id).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/v1/t/{subdomain}/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<Category>>> {
    let business = require_business(&state, &subdomain).await?;
    let category = CategoryRepo::find_by_id(&state.pool, business.id, id)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(DataResponse { data: category }))
}

/// PUT /api/v1/t/{subdomain}/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<DataResponse<Category>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let business = require_business(&state, &subdomain).await?;
    let category = CategoryRepo::update(
        &state.pool,
        business.id,
        id,
        input.name.as_deref(),
        input.description.as_deref(),
        input.active,
        input.sort_order,
    )
    .await?
    .ok_or(not_found(id))?;
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/t/{subdomain}/categories/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
) -> AppResult<StatusCode> {
    let business = require_business(&state, &subdomain).await?;
    let deleted = CategoryRepo::delete(&state.pool, business.id, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id).into())
    }
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Category",
        id: id.to_string(),
    }
}
