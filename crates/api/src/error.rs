use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use comanda_catalog::ResolverError;
use comanda_core::error::CoreError;
use comanda_core::vault::VaultError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `comanda_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A tenant resolution error.
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// A credential vault error. Details never reach the response body.
    #[error("Credential error: {0}")]
    Vault(#[from] VaultError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Access denied. Deliberately carries no reason; webhook signature
    /// failures must not reveal which check rejected them.
    #[error("Forbidden")]
    Forbidden,

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Configuration(msg) => {
                    (StatusCode::CONFLICT, "NOT_CONFIGURED", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Tenant resolution errors ---
            AppError::Resolver(err) => match err {
                ResolverError::NotFound(key) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("No business found for tenant key '{key}'"),
                ),
                ResolverError::Configuration(msg) => {
                    (StatusCode::CONFLICT, "NOT_CONFIGURED", msg.clone())
                }
                ResolverError::Decryption(e) => {
                    tracing::error!(error = %e, "Credential decryption failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "CREDENTIAL_ERROR",
                        "Stored credential could not be used".to_string(),
                    )
                }
                ResolverError::Api(e) => (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    e.to_string(),
                ),
                ResolverError::Database(e) => classify_sqlx_error(e),
            },

            // --- Vault errors ---
            AppError::Vault(err) => {
                tracing::error!(error = %err, "Vault operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CREDENTIAL_ERROR",
                    "Stored credential could not be used".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Forbidden".to_string(),
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let err = AppError::Core(CoreError::NotFound {
            entity: "Product",
            id: "7".into(),
        });
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["error"], "Product with id 7 not found");
    }

    #[tokio::test]
    async fn resolver_not_found_maps_to_404() {
        let err = AppError::Resolver(ResolverError::NotFound("tacos".into()));
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn forbidden_body_carries_no_reason() {
        let (status, body) = response_parts(AppError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden");
    }

    #[tokio::test]
    async fn decryption_failure_is_sanitized() {
        let err = AppError::Vault(VaultError::AuthFailed);
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "CREDENTIAL_ERROR");
        let msg = body["error"].as_str().unwrap();
        assert!(!msg.to_lowercase().contains("tag"));
    }

    #[tokio::test]
    async fn configuration_maps_to_conflict() {
        let err = AppError::Resolver(ResolverError::Configuration("no catalog".into()));
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "NOT_CONFIGURED");
    }
}
