//! Webhook callback routes (root-level, one fixed URL for all tenants).

use axum::routing::get;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// Routes mounted at `/webhook`.
///
/// ```text
/// GET  /webhook    -> subscription handshake
/// POST /webhook    -> signed event intake
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", get(webhook::verify).post(webhook::receive))
}
