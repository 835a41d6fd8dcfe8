use std::sync::Arc;

use comanda_catalog::{CatalogClient, SyncEngine};
use comanda_core::vault::Vault;
use comanda_events::Dispatcher;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: comanda_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Credential vault; the only component allowed to see token plaintext.
    pub vault: Arc<Vault>,
    /// Dispatcher decoupling webhook receipt from processing.
    pub dispatcher: Arc<Dispatcher>,
    /// Catalog reconciliation engine over the production client.
    pub engine: Arc<SyncEngine<CatalogClient>>,
}
