//! Comanda core domain logic.
//!
//! This crate has zero internal dependencies so it can be used by the
//! API layer, the catalog sync engine, and any future worker or CLI
//! tooling. It provides:
//!
//! - [`vault`]: authenticated encryption for long-lived credentials.
//! - [`mapper`]: pure product → commerce-catalog payload mapping.
//! - [`webhook`]: inbound callback signature verification and redaction.
//! - [`error`]: the domain error taxonomy.

pub mod error;
pub mod mapper;
pub mod types;
pub mod vault;
pub mod webhook;

pub use error::CoreError;
pub use vault::{Vault, VaultError};
