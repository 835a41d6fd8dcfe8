use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::business;
use crate::state::AppState;

/// Account routes merged into `/t/{subdomain}`.
///
/// ```text
/// GET  /account                   -> get_account
/// POST /account/link              -> link_account
/// POST /account/catalogs          -> register_catalog
/// PUT  /account/sync-settings     -> update_sync_settings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/account", get(business::get_account))
        .route("/account/link", post(business::link_account))
        .route("/account/catalogs", post(business::register_catalog))
        .route("/account/sync-settings", put(business::update_sync_settings))
}
