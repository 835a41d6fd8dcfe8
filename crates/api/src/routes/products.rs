use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::products;
use crate::state::AppState;

/// Routes mounted at `/t/{subdomain}/products`.
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> delete
/// PATCH  /{id}/availability       -> set_availability
/// GET    /{id}/presentations      -> list_presentations
/// POST   /{id}/presentations      -> create_presentation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::get_by_id)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/{id}/availability", patch(products::set_availability))
        .route(
            "/{id}/presentations",
            get(products::list_presentations).post(products::create_presentation),
        )
}
