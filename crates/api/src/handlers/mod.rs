//! HTTP handlers, one module per resource.
//!
//! Every tenant-scoped handler starts from the `{subdomain}` path
//! segment; [`require_business`] turns it into the tenant row or a 404.
//! Catalog pushes triggered by CRUD writes run in detached tasks via
//! the helpers here so a slow or failing push can never fail the write
//! that caused it.

pub mod business;
pub mod categories;
pub mod orders;
pub mod products;
pub mod staff;
pub mod sync;
pub mod webhook;

use comanda_catalog::resolver;
use comanda_core::error::CoreError;
use comanda_db::models::business::{sync_mode, Business};
use comanda_db::models::product::Product;
use comanda_db::repositories::{BusinessRepo, ProductRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Resolve the `{subdomain}` path segment to its tenant row.
pub(crate) async fn require_business(state: &AppState, subdomain: &str) -> AppResult<Business> {
    BusinessRepo::find_by_subdomain(&state.pool, subdomain)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Business",
            id: subdomain.to_string(),
        }))
}

/// Whether CRUD writes on this tenant push to the catalog immediately.
fn realtime_sync(business: &Business) -> bool {
    business.sync_enabled && business.sync_mode == sync_mode::REALTIME
}

/// What a detached push should do with the product.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PushKind {
    /// Full create-or-update reconciliation.
    Full,
    /// Availability field only.
    Availability,
    /// Remove from the external catalog.
    Delete,
}

/// Fire a catalog push for one product in a detached task.
///
/// No-op unless the tenant is in realtime sync mode. All outcomes are
/// logged; nothing propagates back to the HTTP response.
pub(crate) fn spawn_product_push(state: &AppState, business: &Business, product: Product, kind: PushKind) {
    if !realtime_sync(business) {
        return;
    }

    let state = state.clone();
    let subdomain = business.subdomain.clone();
    tokio::spawn(async move {
        let ctx = match resolver::resolve(
            &state.pool,
            &state.vault,
            &state.config.resolver_config(),
            &subdomain,
            None,
        )
        .await
        {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::warn!(
                    subdomain = %subdomain,
                    error = %e,
                    "Skipping catalog push, tenant resolution failed"
                );
                return;
            }
        };

        let result = match kind {
            PushKind::Full => {
                let presentations = match ProductRepo::list_presentations(&state.pool, product.id).await {
                    Ok(p) => p,
                    Err(e) => {
                        tracing::warn!(product_id = product.id, error = %e, "Skipping catalog push, presentation load failed");
                        return;
                    }
                };
                state.engine.sync_product(&ctx, &product, &presentations).await
            }
            PushKind::Availability => state.engine.sync_availability(&ctx, &product).await,
            PushKind::Delete => state.engine.delete_product(&ctx, &product).await,
        };

        if result.success {
            tracing::info!(
                business_id = ctx.business.id,
                retailer_id = %result.retailer_id,
                action = ?result.action,
                "Catalog push completed"
            );
        } else {
            tracing::warn!(
                business_id = ctx.business.id,
                retailer_id = %result.retailer_id,
                action = ?result.action,
                error = result.error.as_deref().unwrap_or("unknown"),
                "Catalog push failed"
            );
        }
    });
}
