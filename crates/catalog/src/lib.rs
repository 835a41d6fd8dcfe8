//! Commerce-catalog integration: external API client, tenant
//! resolution, and the reconciliation engine.
//!
//! The flow for a single product write is:
//!
//! 1. [`resolver::resolve`] turns a tenant key into a [`resolver::TenantContext`]
//!    with a decrypted access token.
//! 2. [`sync::SyncEngine`] decides create/update/delete/skip and maps the
//!    product through `comanda_core::mapper`.
//! 3. [`client::CatalogClient`] executes the remote call.
//!
//! Nothing in this crate throws past the engine boundary: callers get
//! [`sync::SyncResult`] values and decide what to log.

pub mod client;
pub mod resolver;
pub mod sync;

pub use client::{CatalogApi, CatalogApiError, CatalogClient};
pub use resolver::{ResolverConfig, ResolverError, TenantContext};
pub use sync::{BatchSyncResult, SyncAction, SyncEngine, SyncResult};
