pub mod business;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod staff;
pub mod sync;
pub mod webhook;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /businesses                                      create tenant
///
/// /t/{subdomain}/products                          list, create
/// /t/{subdomain}/products/{id}                     get, update, delete
/// /t/{subdomain}/products/{id}/availability        stock toggle (PATCH)
/// /t/{subdomain}/products/{id}/presentations       list, create
/// /t/{subdomain}/categories                        list, create
/// /t/{subdomain}/categories/{id}                   get, update, delete
/// /t/{subdomain}/orders                            list, create
/// /t/{subdomain}/orders/{id}                       get, delete
/// /t/{subdomain}/orders/{id}/status                update status (PUT)
/// /t/{subdomain}/staff                             list, create
/// /t/{subdomain}/staff/{id}                        get, update, delete
/// /t/{subdomain}/account                           get
/// /t/{subdomain}/account/link                      link platform account (POST)
/// /t/{subdomain}/account/catalogs                  register catalog id (POST)
/// /t/{subdomain}/account/sync-settings             update (PUT)
/// /t/{subdomain}/sync/products                     full batch push (POST)
/// /t/{subdomain}/sync/categories/{id}              category batch push (POST)
/// /t/{subdomain}/sync/catalogs/provision           provision catalogs (POST)
/// /t/{subdomain}/sync/status                       sync snapshot (GET)
/// ```
///
/// The webhook callback lives at the root level (`/webhook`), not here:
/// the platform calls one fixed URL for all tenants.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/businesses", post(handlers::business::create))
        .nest("/t/{subdomain}", tenant_routes())
}

/// Routes scoped to one tenant via the `{subdomain}` path segment.
fn tenant_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/orders", orders::router())
        .nest("/staff", staff::router())
        .nest("/sync", sync::router())
        .merge(business::router())
}
