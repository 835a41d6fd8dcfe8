use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sync;
use crate::state::AppState;

/// Routes mounted at `/t/{subdomain}/sync`.
///
/// ```text
/// POST /products                  -> sync_products (full batch)
/// POST /categories/{id}           -> sync_category
/// POST /catalogs/provision        -> provision_catalogs
/// GET  /status                    -> status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", post(sync::sync_products))
        .route("/categories/{id}", post(sync::sync_category))
        .route("/catalogs/provision", post(sync::provision_catalogs))
        .route("/status", get(sync::status))
}
