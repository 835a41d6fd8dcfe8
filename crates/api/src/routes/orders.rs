use axum::routing::{get, put};
use axum::Router;

use crate::handlers::orders;
use crate::state::AppState;

/// Routes mounted at `/t/{subdomain}/orders`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route("/{id}", get(orders::get_by_id).delete(orders::delete))
        .route("/{id}/status", put(orders::update_status))
}
