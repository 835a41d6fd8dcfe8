//! Handlers for the tenant-scoped `/staff` resource. Basic records
//! only; scheduling is out of scope.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use comanda_core::error::CoreError;
use comanda_core::types::DbId;
use comanda_db::models::staff::{CreateStaff, StaffMember, UpdateStaff};
use comanda_db::repositories::StaffRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::require_business;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/t/{subdomain}/staff
pub async fn create(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
    Json(input): Json<CreateStaff>,
) -> AppResult<(StatusCode, Json<DataResponse<StaffMember>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let business = require_business(&state, &subdomain).await?;
    let member = StaffRepo::create(
        &state.pool,
        business.id,
        &input.name,
        input.email.as_deref(),
        input.phone.as_deref(),
        &input.role,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}

/// GET /api/v1/t/{subdomain}/staff
pub async fn list(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> AppResult<Json<DataResponse<Vec<StaffMember>>>> {
    let business = require_business(&state, &subdomain).await?;
    let staff = StaffRepo::list(&state.pool, business.id).await?;
    Ok(Json(DataResponse { data: staff }))
}

/// GET /api/v1/t/{subdomain}/staff/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<StaffMember>>> {
    let business = require_business(&state, &subdomain).await?;
    let member = StaffRepo::find_by_id(&state.pool, business.id, id)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(DataResponse { data: member }))
}

/// PUT /api/v1/t/{subdomain}/staff/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
    Json(input): Json<UpdateStaff>,
) -> AppResult<Json<DataResponse<StaffMember>>> {
    let business = require_business(&state, &subdomain).await?;
    let member = StaffRepo::update(
        &state.pool,
        business.id,
        id,
        input.name.as_deref(),
        input.email.as_deref(),
        input.phone.as_deref(),
        input.role.as_deref(),
        input.active,
    )
    .await?
    .ok_or(not_found(id))?;
    Ok(Json(DataResponse { data: member }))
}

/// DELETE /api/v1/t/{subdomain}/staff/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
) -> AppResult<StatusCode> {
    let business = require_business(&state, &subdomain).await?;
    let deleted = StaffRepo::delete(&state.pool, business.id, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id).into())
    }
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "StaffMember",
        id: id.to_string(),
    }
}
