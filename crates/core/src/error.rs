//! Domain error taxonomy shared across crates.

/// Core domain error.
///
/// HTTP mapping lives in the API crate's `AppError`; this type stays
/// transport-agnostic.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup came back empty.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Input failed domain validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A required piece of configuration (token, catalog id, owner id)
    /// is absent. Not retryable; surfaced as a skip, never a crash.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
