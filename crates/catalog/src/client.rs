//! HTTP client for the external commerce-catalog API.
//!
//! Thin request/response layer over the platform's Graph-style REST
//! endpoints. The reconciliation engine talks to the [`CatalogApi`]
//! trait so tests can substitute a scripted double; [`CatalogClient`]
//! is the reqwest-backed production implementation.

use std::time::Duration;

use async_trait::async_trait;
use comanda_core::mapper::{Availability, ExternalProduct};
use serde::{Deserialize, Serialize};

/// Default Graph API root.
const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/v21.0";

/// HTTP request timeout for a single API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Catalog vertical used when provisioning new catalogs.
pub const CATALOG_VERTICAL_COMMERCE: &str = "commerce";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Failures talking to the external catalog API.
#[derive(Debug, thiserror::Error)]
pub enum CatalogApiError {
    /// The underlying HTTP request failed (network, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The platform rejected the call; its message is preserved
    /// verbatim for the caller's logs.
    #[error("Platform error {code}: {message}")]
    Platform { code: i64, message: String },

    /// The response body was not the shape we expected.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Minimal view of a product row in the remote catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteProduct {
    /// The platform's own graph id for the catalog item.
    pub id: String,
    pub retailer_id: String,
}

/// Opaque handle returned when the platform accepts a batch.
///
/// Acceptance is not completion: the platform applies batch items
/// asynchronously and per-item outcomes are unknown at return time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchHandle(pub String);

/// One request inside a batch envelope.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRequest {
    pub method: BatchMethod,
    pub data: serde_json::Value,
}

/// Batch item methods understood by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BatchMethod {
    Create,
    Update,
    Delete,
}

impl BatchRequest {
    /// Build an UPDATE request from a mapped product payload.
    pub fn update(product: &ExternalProduct) -> Self {
        Self {
            method: BatchMethod::Update,
            data: serde_json::to_value(product).unwrap_or_default(),
        }
    }

    /// Build a CREATE request from a mapped product payload.
    pub fn create(product: &ExternalProduct) -> Self {
        Self {
            method: BatchMethod::Create,
            data: serde_json::to_value(product).unwrap_or_default(),
        }
    }

    /// Build a DELETE request keyed by retailer id.
    pub fn delete(retailer_id: &str) -> Self {
        Self {
            method: BatchMethod::Delete,
            data: serde_json::json!({ "retailer_id": retailer_id }),
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Request/response contract with the remote commerce-catalog API.
///
/// Every call carries the tenant's bearer token; the client itself is
/// tenant-agnostic and shared across the application.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Look up a catalog item by retailer id. `Ok(None)` means the
    /// item does not exist; any other failure is an error.
    async fn get_product(
        &self,
        token: &str,
        catalog_id: &str,
        retailer_id: &str,
    ) -> Result<Option<RemoteProduct>, CatalogApiError>;

    /// Create a single catalog item. Returns the platform's graph id.
    async fn create_product(
        &self,
        token: &str,
        catalog_id: &str,
        product: &ExternalProduct,
    ) -> Result<String, CatalogApiError>;

    /// Update a single catalog item, keyed by its retailer id.
    async fn update_product(
        &self,
        token: &str,
        catalog_id: &str,
        product: &ExternalProduct,
    ) -> Result<(), CatalogApiError>;

    /// Update only the availability field of a catalog item.
    /// Minimal payload for high-frequency stock toggles.
    async fn update_availability(
        &self,
        token: &str,
        catalog_id: &str,
        retailer_id: &str,
        availability: Availability,
    ) -> Result<(), CatalogApiError>;

    /// Remove a catalog item, keyed by its retailer id.
    async fn delete_product(
        &self,
        token: &str,
        catalog_id: &str,
        retailer_id: &str,
    ) -> Result<(), CatalogApiError>;

    /// Submit a batch of item operations. The platform accepts the
    /// batch asynchronously and returns a handle, not per-item results.
    async fn submit_batch(
        &self,
        token: &str,
        catalog_id: &str,
        requests: &[BatchRequest],
    ) -> Result<BatchHandle, CatalogApiError>;

    /// Create a new commerce catalog owned by a business entity.
    /// Returns the new catalog id.
    async fn create_catalog(
        &self,
        token: &str,
        owner_id: &str,
        name: &str,
        vertical: &str,
    ) -> Result<String, CatalogApiError>;

    /// Resolve the business entity that owns a messaging account.
    async fn lookup_owner(
        &self,
        token: &str,
        waba_id: &str,
    ) -> Result<Option<String>, CatalogApiError>;
}

// ---------------------------------------------------------------------------
// CatalogClient
// ---------------------------------------------------------------------------

/// Production [`CatalogApi`] implementation backed by reqwest.
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a client against the default Graph endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (tests, proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Execute a request, surfacing platform error payloads.
    ///
    /// The platform reports failures as HTTP errors with an
    /// `{"error": {"message", "code"}}` body; the message is preserved.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, CatalogApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CatalogApiError::Decode(e.to_string()))?;

        if !status.is_success() {
            let code = body["error"]["code"].as_i64().unwrap_or(status.as_u16() as i64);
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("unknown platform error")
                .to_string();
            return Err(CatalogApiError::Platform { code, message });
        }

        Ok(body)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn get_product(
        &self,
        token: &str,
        catalog_id: &str,
        retailer_id: &str,
    ) -> Result<Option<RemoteProduct>, CatalogApiError> {
        let filter = serde_json::json!({ "retailer_id": { "eq": retailer_id } }).to_string();
        let body = self
            .execute(
                self.client
                    .get(self.url(&format!("{catalog_id}/products")))
                    .bearer_auth(token)
                    .query(&[("filter", filter.as_str()), ("fields", "id,retailer_id")]),
            )
            .await?;

        let Some(items) = body["data"].as_array() else {
            return Err(CatalogApiError::Decode("missing data array".into()));
        };
        match items.first() {
            None => Ok(None),
            Some(item) => serde_json::from_value(item.clone())
                .map(Some)
                .map_err(|e| CatalogApiError::Decode(e.to_string())),
        }
    }

    async fn create_product(
        &self,
        token: &str,
        catalog_id: &str,
        product: &ExternalProduct,
    ) -> Result<String, CatalogApiError> {
        let body = self
            .execute(
                self.client
                    .post(self.url(&format!("{catalog_id}/products")))
                    .bearer_auth(token)
                    .json(product),
            )
            .await?;

        body["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| CatalogApiError::Decode("create response missing id".into()))
    }

    async fn update_product(
        &self,
        token: &str,
        catalog_id: &str,
        product: &ExternalProduct,
    ) -> Result<(), CatalogApiError> {
        self.submit_batch(token, catalog_id, &[BatchRequest::update(product)])
            .await
            .map(|_| ())
    }

    async fn update_availability(
        &self,
        token: &str,
        catalog_id: &str,
        retailer_id: &str,
        availability: Availability,
    ) -> Result<(), CatalogApiError> {
        let request = BatchRequest {
            method: BatchMethod::Update,
            data: serde_json::json!({
                "retailer_id": retailer_id,
                "availability": availability,
            }),
        };
        self.submit_batch(token, catalog_id, &[request])
            .await
            .map(|_| ())
    }

    async fn delete_product(
        &self,
        token: &str,
        catalog_id: &str,
        retailer_id: &str,
    ) -> Result<(), CatalogApiError> {
        self.submit_batch(token, catalog_id, &[BatchRequest::delete(retailer_id)])
            .await
            .map(|_| ())
    }

    async fn submit_batch(
        &self,
        token: &str,
        catalog_id: &str,
        requests: &[BatchRequest],
    ) -> Result<BatchHandle, CatalogApiError> {
        let envelope = serde_json::json!({
            "item_type": "PRODUCT_ITEM",
            "requests": requests,
        });
        let body = self
            .execute(
                self.client
                    .post(self.url(&format!("{catalog_id}/items_batch")))
                    .bearer_auth(token)
                    .json(&envelope),
            )
            .await?;

        body["handles"]
            .as_array()
            .and_then(|h| h.first())
            .and_then(|h| h.as_str())
            .map(|h| BatchHandle(h.to_string()))
            .ok_or_else(|| CatalogApiError::Decode("batch response missing handle".into()))
    }

    async fn create_catalog(
        &self,
        token: &str,
        owner_id: &str,
        name: &str,
        vertical: &str,
    ) -> Result<String, CatalogApiError> {
        let body = self
            .execute(
                self.client
                    .post(self.url(&format!("{owner_id}/owned_product_catalogs")))
                    .bearer_auth(token)
                    .json(&serde_json::json!({ "name": name, "vertical": vertical })),
            )
            .await?;

        body["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| CatalogApiError::Decode("catalog response missing id".into()))
    }

    async fn lookup_owner(
        &self,
        token: &str,
        waba_id: &str,
    ) -> Result<Option<String>, CatalogApiError> {
        let body = self
            .execute(
                self.client
                    .get(self.url(waba_id))
                    .bearer_auth(token)
                    .query(&[("fields", "owner_business_info")]),
            )
            .await?;

        Ok(body["owner_business_info"]["id"].as_str().map(str::to_string))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_method_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&BatchMethod::Create).unwrap(),
            r#""CREATE""#
        );
        assert_eq!(
            serde_json::to_string(&BatchMethod::Delete).unwrap(),
            r#""DELETE""#
        );
    }

    #[test]
    fn delete_request_carries_retailer_id_only() {
        let request = BatchRequest::delete("prod-001");
        assert_eq!(request.method, BatchMethod::Delete);
        assert_eq!(request.data, serde_json::json!({ "retailer_id": "prod-001" }));
    }

    #[test]
    fn client_builds_urls_from_base() {
        let client = CatalogClient::with_base_url("http://localhost:9000/v21.0");
        assert_eq!(
            client.url("cat-1/products"),
            "http://localhost:9000/v21.0/cat-1/products"
        );
    }

    #[test]
    fn platform_error_preserves_message() {
        let err = CatalogApiError::Platform {
            code: 100,
            message: "Unsupported post request".into(),
        };
        assert_eq!(err.to_string(), "Platform error 100: Unsupported post request");
    }
}
