//! Handlers for the tenant-scoped `/orders` resource.
//!
//! Orders are plain records with a status field; kitchen and delivery
//! lifecycle live elsewhere.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use comanda_core::error::CoreError;
use comanda_core::types::DbId;
use comanda_db::models::order::{order_status, CreateOrder, Order, UpdateOrderStatus};
use comanda_db::repositories::OrderRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::require_business;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/t/{subdomain}/orders
pub async fn create(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
    Json(input): Json<CreateOrder>,
) -> AppResult<(StatusCode, Json<DataResponse<Order>>)> {
    if !input.items.is_array() {
        return Err(AppError::BadRequest("items must be an array".into()));
    }
    if input.total < 0.0 {
        return Err(AppError::BadRequest("total must not be negative".into()));
    }
    let business = require_business(&state, &subdomain).await?;
    let order = OrderRepo::create(
        &state.pool,
        business.id,
        input.customer_phone.as_deref(),
        &input.items,
        input.total,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: order })))
}

/// GET /api/v1/t/{subdomain}/orders
pub async fn list(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> AppResult<Json<DataResponse<Vec<Order>>>> {
    let business = require_business(&state, &subdomain).await?;
    let orders = OrderRepo::list(&state.pool, business.id).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// GET /api/v1/t/{subdomain}/orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<Order>>> {
    let business = require_business(&state, &subdomain).await?;
    let order = OrderRepo::find_by_id(&state.pool, business.id, id)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(DataResponse { data: order }))
}

/// PUT /api/v1/t/{subdomain}/orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
    Json(input): Json<UpdateOrderStatus>,
) -> AppResult<Json<DataResponse<Order>>> {
    if !is_known_status(&input.status) {
        return Err(AppError::BadRequest(format!(
            "unknown order status '{}'",
            input.status
        )));
    }
    let business = require_business(&state, &subdomain).await?;
    let order = OrderRepo::update_status(&state.pool, business.id, id, &input.status)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(DataResponse { data: order }))
}

/// DELETE /api/v1/t/{subdomain}/orders/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path((subdomain, id)): Path<(String, DbId)>,
) -> AppResult<StatusCode> {
    let business = require_business(&state, &subdomain).await?;
    let deleted = OrderRepo::delete(&state.pool, business.id, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id).into())
    }
}

fn is_known_status(status: &str) -> bool {
    matches!(
        status,
        order_status::PENDING
            | order_status::CONFIRMED
            | order_status::COMPLETED
            | order_status::CANCELLED
    )
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Order",
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_are_accepted() {
        for status in ["pending", "confirmed", "completed", "cancelled"] {
            assert!(is_known_status(status), "{status} should be known");
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(!is_known_status("shipped"));
        assert!(!is_known_status(""));
    }
}
