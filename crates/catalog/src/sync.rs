//! Catalog reconciliation engine.
//!
//! Decides create/update/delete/skip per product and issues the
//! corresponding external calls. Internal state is the source of truth;
//! the external catalog is eventually reconciled toward it. No local
//! transaction spans the two stores.
//!
//! Every public method returns a result object instead of propagating
//! errors: the CRUD layer fires sync in the background and a sync
//! failure must never fail the write that triggered it.

use comanda_core::mapper::{self, Availability, MapperOptions};
use comanda_core::types::DbId;
use serde::Serialize;

use comanda_db::models::business::Business;
use comanda_db::models::category::Category;
use comanda_db::models::product::{Presentation, Product};

use crate::client::{BatchRequest, CatalogApi};
use crate::resolver::TenantContext;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// The action the engine took (or declined to take) for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Create,
    Update,
    Delete,
    Skip,
}

/// Outcome of a single-product reconciliation. Ephemeral: returned to
/// the caller and/or logged, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub success: bool,
    pub retailer_id: String,
    pub catalog_id: Option<String>,
    pub action: SyncAction,
    pub error: Option<String>,
}

impl SyncResult {
    fn ok(retailer_id: &str, catalog_id: &str, action: SyncAction) -> Self {
        Self {
            success: true,
            retailer_id: retailer_id.to_string(),
            catalog_id: Some(catalog_id.to_string()),
            action,
            error: None,
        }
    }

    fn skipped(retailer_id: &str, reason: &str) -> Self {
        Self {
            success: true,
            retailer_id: retailer_id.to_string(),
            catalog_id: None,
            action: SyncAction::Skip,
            error: Some(reason.to_string()),
        }
    }

    fn failed(retailer_id: &str, catalog_id: Option<&str>, action: SyncAction, error: String) -> Self {
        Self {
            success: false,
            retailer_id: retailer_id.to_string(),
            catalog_id: catalog_id.map(str::to_string),
            action,
            error: Some(error),
        }
    }
}

/// Aggregate outcome of a batch reconciliation.
///
/// `batch_handle` being set means the platform *accepted* the batch;
/// per-item completion is applied asynchronously on the platform side
/// and is unknown at return time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSyncResult {
    pub synced: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    pub batch_handle: Option<String>,
}

/// Outcome of per-category catalog provisioning. Partial success is
/// expected; already-created catalogs are never rolled back.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisionResult {
    pub created: Vec<CategoryCatalog>,
    pub failed: Vec<ProvisionFailure>,
}

/// A newly provisioned category catalog mapping.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCatalog {
    pub category_id: DbId,
    pub catalog_id: String,
}

/// A category whose catalog could not be provisioned.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionFailure {
    pub category_id: DbId,
    pub error: String,
}

// ---------------------------------------------------------------------------
// Target resolution / eligibility
// ---------------------------------------------------------------------------

/// Resolve which external catalog a product (or scope) targets.
///
/// Category-specific mapping wins; otherwise the tenant's primary
/// catalog; otherwise `None` (the caller skips with "not configured").
pub fn resolve_catalog_id(business: &Business, category_id: Option<DbId>) -> Option<String> {
    category_id
        .and_then(|id| business.category_catalog_id(id))
        .or_else(|| business.primary_catalog_id())
        .map(str::to_string)
}

/// Whether a product should be pushed at all.
///
/// Inactive products are not pushed, except when they are explicitly
/// out of stock, so a stale external listing can still be marked
/// unavailable.
fn is_eligible(product: &Product) -> bool {
    product.active || product.out_of_stock
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Reconciliation engine over a [`CatalogApi`] implementation.
///
/// Stateless besides the API handle; safe to share via `Arc`.
pub struct SyncEngine<A: CatalogApi> {
    api: A,
}

impl<A: CatalogApi> SyncEngine<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// The underlying API client (for callers that need direct access,
    /// e.g. the owner-id resolver).
    pub fn api(&self) -> &A {
        &self.api
    }

    // -----------------------------------------------------------------------
    // Single product
    // -----------------------------------------------------------------------

    /// Reconcile one product: create it in the external catalog if its
    /// retailer id is absent, update it otherwise.
    pub async fn sync_product(
        &self,
        ctx: &TenantContext,
        product: &Product,
        presentations: &[Presentation],
    ) -> SyncResult {
        let Some(catalog_id) = resolve_catalog_id(&ctx.business, product.category_id) else {
            return SyncResult::skipped(&product.retailer_id, "catalog not configured");
        };
        if !is_eligible(product) {
            return SyncResult::skipped(&product.retailer_id, "product inactive");
        }

        let view = product.to_view(presentations);
        let payload = match mapper::map_to_external(&view, &MapperOptions::default()) {
            Ok(payload) => payload,
            Err(err) => {
                return SyncResult::failed(
                    &product.retailer_id,
                    Some(&catalog_id),
                    SyncAction::Skip,
                    err.to_string(),
                );
            }
        };

        let exists = match self
            .api
            .get_product(&ctx.access_token, &catalog_id, &product.retailer_id)
            .await
        {
            Ok(found) => found.is_some(),
            Err(err) => {
                return SyncResult::failed(
                    &product.retailer_id,
                    Some(&catalog_id),
                    SyncAction::Skip,
                    format!("existence check failed: {err}"),
                );
            }
        };

        if exists {
            match self
                .api
                .update_product(&ctx.access_token, &catalog_id, &payload)
                .await
            {
                Ok(()) => SyncResult::ok(&product.retailer_id, &catalog_id, SyncAction::Update),
                Err(err) => SyncResult::failed(
                    &product.retailer_id,
                    Some(&catalog_id),
                    SyncAction::Update,
                    err.to_string(),
                ),
            }
        } else {
            match self
                .api
                .create_product(&ctx.access_token, &catalog_id, &payload)
                .await
            {
                Ok(_) => SyncResult::ok(&product.retailer_id, &catalog_id, SyncAction::Create),
                Err(err) => SyncResult::failed(
                    &product.retailer_id,
                    Some(&catalog_id),
                    SyncAction::Create,
                    err.to_string(),
                ),
            }
        }
    }

    /// Push only the availability field. Minimal payload for
    /// high-frequency stock toggles.
    pub async fn sync_availability(&self, ctx: &TenantContext, product: &Product) -> SyncResult {
        let Some(catalog_id) = resolve_catalog_id(&ctx.business, product.category_id) else {
            return SyncResult::skipped(&product.retailer_id, "catalog not configured");
        };
        if !is_eligible(product) {
            return SyncResult::skipped(&product.retailer_id, "product inactive");
        }

        let availability =
            Availability::from_flags(product.active, product.available, product.out_of_stock);
        match self
            .api
            .update_availability(&ctx.access_token, &catalog_id, &product.retailer_id, availability)
            .await
        {
            Ok(()) => SyncResult::ok(&product.retailer_id, &catalog_id, SyncAction::Update),
            Err(err) => SyncResult::failed(
                &product.retailer_id,
                Some(&catalog_id),
                SyncAction::Update,
                err.to_string(),
            ),
        }
    }

    /// Remove a product from the external catalog.
    ///
    /// A tenant with no catalog configured has nothing to remove; that
    /// is a skip, not an error.
    pub async fn delete_product(&self, ctx: &TenantContext, product: &Product) -> SyncResult {
        let Some(catalog_id) = resolve_catalog_id(&ctx.business, product.category_id) else {
            return SyncResult::skipped(&product.retailer_id, "catalog not configured");
        };

        match self
            .api
            .delete_product(&ctx.access_token, &catalog_id, &product.retailer_id)
            .await
        {
            Ok(()) => SyncResult::ok(&product.retailer_id, &catalog_id, SyncAction::Delete),
            Err(err) => SyncResult::failed(
                &product.retailer_id,
                Some(&catalog_id),
                SyncAction::Delete,
                err.to_string(),
            ),
        }
    }

    // -----------------------------------------------------------------------
    // Batch
    // -----------------------------------------------------------------------

    /// Reconcile a set of products as one batched create submission.
    ///
    /// `category_id` scopes the target catalog and enables price-range
    /// mapping. The caller loads the product set (active products of
    /// the tenant, optionally one category).
    pub async fn sync_batch(
        &self,
        ctx: &TenantContext,
        items: &[(Product, Vec<Presentation>)],
        category_id: Option<DbId>,
    ) -> BatchSyncResult {
        let mut result = BatchSyncResult::default();
        if items.is_empty() {
            return result;
        }

        let Some(catalog_id) = resolve_catalog_id(&ctx.business, category_id) else {
            result.skipped = items.len();
            result.errors.push("catalog not configured".to_string());
            return result;
        };

        let opts = MapperOptions {
            include_price_range: category_id.is_some(),
        };

        let mut requests = Vec::with_capacity(items.len());
        for (product, presentations) in items {
            if !is_eligible(product) {
                result.skipped += 1;
                continue;
            }
            match mapper::map_to_external(&product.to_view(presentations), &opts) {
                Ok(payload) => requests.push(BatchRequest::create(&payload)),
                Err(err) => {
                    result.failed += 1;
                    result.errors.push(format!("{}: {err}", product.retailer_id));
                }
            }
        }

        if requests.is_empty() {
            return result;
        }

        match self
            .api
            .submit_batch(&ctx.access_token, &catalog_id, &requests)
            .await
        {
            Ok(handle) => {
                // Accepted, not completed: the platform applies batch
                // items asynchronously.
                result.synced = requests.len();
                result.batch_handle = Some(handle.0);
            }
            Err(err) => {
                result.failed += requests.len();
                result.errors.push(format!("batch submission failed: {err}"));
            }
        }
        result
    }

    // -----------------------------------------------------------------------
    // Category catalog provisioning
    // -----------------------------------------------------------------------

    /// Create one external catalog per active category that has no
    /// mapping yet.
    ///
    /// Partial success: a failing category is recorded and the loop
    /// continues; already-created catalogs are never rolled back. The
    /// caller persists the returned mappings on the tenant credential.
    pub async fn provision_category_catalogs(
        &self,
        ctx: &TenantContext,
        owner_id: &str,
        categories: &[Category],
    ) -> ProvisionResult {
        let mut result = ProvisionResult::default();

        for category in categories {
            if !category.active {
                continue;
            }
            if ctx.business.category_catalog_id(category.id).is_some() {
                continue;
            }

            let name = format!("{} - {}", ctx.business.name, category.name);
            match self
                .api
                .create_catalog(
                    &ctx.access_token,
                    owner_id,
                    &name,
                    crate::client::CATALOG_VERTICAL_COMMERCE,
                )
                .await
            {
                Ok(catalog_id) => {
                    tracing::info!(
                        business_id = ctx.business.id,
                        category_id = category.id,
                        catalog_id = %catalog_id,
                        "Provisioned category catalog",
                    );
                    result.created.push(CategoryCatalog {
                        category_id: category.id,
                        catalog_id,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        business_id = ctx.business.id,
                        category_id = category.id,
                        error = %err,
                        "Category catalog provisioning failed",
                    );
                    result.failed.push(ProvisionFailure {
                        category_id: category.id,
                        error: err.to_string(),
                    });
                }
            }
        }

        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{BatchHandle, CatalogApiError, RemoteProduct};
    use async_trait::async_trait;
    use comanda_core::mapper::ExternalProduct;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Scripted stand-in for the platform API. Records every call so
    /// tests can assert that skips make zero network calls.
    #[derive(Default)]
    struct ScriptedCatalog {
        existing: HashSet<String>,
        fail_catalog_names_containing: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedCatalog {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CatalogApi for ScriptedCatalog {
        async fn get_product(
            &self,
            _token: &str,
            _catalog_id: &str,
            retailer_id: &str,
        ) -> Result<Option<RemoteProduct>, CatalogApiError> {
            self.record(format!("get:{retailer_id}"));
            Ok(self.existing.contains(retailer_id).then(|| RemoteProduct {
                id: "graph-1".into(),
                retailer_id: retailer_id.into(),
            }))
        }

        async fn create_product(
            &self,
            _token: &str,
            catalog_id: &str,
            product: &ExternalProduct,
        ) -> Result<String, CatalogApiError> {
            self.record(format!("create:{}:{}", catalog_id, product.retailer_id));
            Ok("graph-new".into())
        }

        async fn update_product(
            &self,
            _token: &str,
            catalog_id: &str,
            product: &ExternalProduct,
        ) -> Result<(), CatalogApiError> {
            self.record(format!("update:{}:{}", catalog_id, product.retailer_id));
            Ok(())
        }

        async fn update_availability(
            &self,
            _token: &str,
            _catalog_id: &str,
            retailer_id: &str,
            availability: Availability,
        ) -> Result<(), CatalogApiError> {
            self.record(format!("availability:{retailer_id}:{availability:?}"));
            Ok(())
        }

        async fn delete_product(
            &self,
            _token: &str,
            _catalog_id: &str,
            retailer_id: &str,
        ) -> Result<(), CatalogApiError> {
            self.record(format!("delete:{retailer_id}"));
            Ok(())
        }

        async fn submit_batch(
            &self,
            _token: &str,
            catalog_id: &str,
            requests: &[BatchRequest],
        ) -> Result<BatchHandle, CatalogApiError> {
            self.record(format!("batch:{}:{}", catalog_id, requests.len()));
            Ok(BatchHandle("handle-1".into()))
        }

        async fn create_catalog(
            &self,
            _token: &str,
            _owner_id: &str,
            name: &str,
            _vertical: &str,
        ) -> Result<String, CatalogApiError> {
            self.record(format!("create_catalog:{name}"));
            if let Some(needle) = &self.fail_catalog_names_containing {
                if name.contains(needle.as_str()) {
                    return Err(CatalogApiError::Platform {
                        code: 100,
                        message: "catalog limit reached".into(),
                    });
                }
            }
            Ok(format!("cat-for-{name}"))
        }

        async fn lookup_owner(
            &self,
            _token: &str,
            _waba_id: &str,
        ) -> Result<Option<String>, CatalogApiError> {
            self.record("lookup_owner");
            Ok(Some("owner-1".into()))
        }
    }

    // -- Fixtures ----------------------------------------------------------

    fn business(catalog_ids: serde_json::Value, map: serde_json::Value) -> Business {
        Business {
            id: 1,
            subdomain: "tacos-don-jose".into(),
            name: "Tacos Don José".into(),
            waba_id: Some("waba-100".into()),
            phone_number_id: Some("phone-55".into()),
            access_token_enc: None,
            refresh_token_enc: None,
            token_expires_at: None,
            catalog_owner_id: None,
            catalog_ids,
            category_catalog_map: map,
            sync_enabled: true,
            sync_mode: "realtime".into(),
            last_synced_at: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn ctx_with_catalog() -> TenantContext {
        TenantContext {
            business: business(serde_json::json!(["cat-main"]), serde_json::json!({})),
            access_token: "token".into(),
            degraded: false,
        }
    }

    fn ctx_without_catalog() -> TenantContext {
        TenantContext {
            business: business(serde_json::json!([]), serde_json::json!({})),
            access_token: "token".into(),
            degraded: false,
        }
    }

    fn product(retailer_id: &str) -> Product {
        let now = chrono::Utc::now();
        Product {
            id: 1,
            business_id: 1,
            category_id: None,
            retailer_id: retailer_id.into(),
            name: "Tacos al pastor".into(),
            description: None,
            price: 19.99,
            currency: "MXN".into(),
            active: true,
            available: true,
            out_of_stock: false,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn category(id: DbId, name: &str, active: bool) -> Category {
        let now = chrono::Utc::now();
        Category {
            id,
            business_id: 1,
            name: name.into(),
            description: None,
            active,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    // -- Catalog target resolution -----------------------------------------

    #[test]
    fn category_mapping_wins_over_primary() {
        let b = business(
            serde_json::json!(["cat-main"]),
            serde_json::json!({"7": "cat-drinks"}),
        );
        assert_eq!(resolve_catalog_id(&b, Some(7)).as_deref(), Some("cat-drinks"));
        assert_eq!(resolve_catalog_id(&b, Some(8)).as_deref(), Some("cat-main"));
        assert_eq!(resolve_catalog_id(&b, None).as_deref(), Some("cat-main"));
    }

    #[test]
    fn no_catalogs_resolves_to_none() {
        let b = business(serde_json::json!([]), serde_json::json!({}));
        assert_eq!(resolve_catalog_id(&b, None), None);
    }

    // -- Single product ----------------------------------------------------

    #[tokio::test]
    async fn absent_product_is_created() {
        let engine = SyncEngine::new(ScriptedCatalog::default());
        let result = engine
            .sync_product(&ctx_with_catalog(), &product("prod-001"), &[])
            .await;

        assert!(result.success);
        assert_eq!(result.action, SyncAction::Create);
        assert_eq!(
            engine.api().calls(),
            vec!["get:prod-001", "create:cat-main:prod-001"]
        );
    }

    #[tokio::test]
    async fn existing_product_is_updated() {
        let api = ScriptedCatalog {
            existing: HashSet::from(["prod-001".to_string()]),
            ..Default::default()
        };
        let engine = SyncEngine::new(api);
        let result = engine
            .sync_product(&ctx_with_catalog(), &product("prod-001"), &[])
            .await;

        assert!(result.success);
        assert_eq!(result.action, SyncAction::Update);
        assert_eq!(
            engine.api().calls(),
            vec!["get:prod-001", "update:cat-main:prod-001"]
        );
    }

    #[tokio::test]
    async fn missing_catalog_skips_without_network_calls() {
        let engine = SyncEngine::new(ScriptedCatalog::default());
        let result = engine
            .sync_product(&ctx_without_catalog(), &product("prod-001"), &[])
            .await;

        assert_eq!(result.action, SyncAction::Skip);
        assert!(engine.api().calls().is_empty());
    }

    #[tokio::test]
    async fn inactive_product_is_skipped() {
        let engine = SyncEngine::new(ScriptedCatalog::default());
        let mut p = product("prod-001");
        p.active = false;
        let result = engine.sync_product(&ctx_with_catalog(), &p, &[]).await;

        assert_eq!(result.action, SyncAction::Skip);
        assert!(engine.api().calls().is_empty());
    }

    #[tokio::test]
    async fn inactive_out_of_stock_product_is_still_pushed() {
        // A stale external listing must still be markable unavailable.
        let engine = SyncEngine::new(ScriptedCatalog::default());
        let mut p = product("prod-001");
        p.active = false;
        p.out_of_stock = true;
        let result = engine.sync_product(&ctx_with_catalog(), &p, &[]).await;

        assert!(result.success);
        assert_eq!(result.action, SyncAction::Create);
    }

    #[tokio::test]
    async fn invalid_price_fails_before_any_network_call() {
        let engine = SyncEngine::new(ScriptedCatalog::default());
        let mut p = product("prod-001");
        p.price = -1.0;
        let result = engine.sync_product(&ctx_with_catalog(), &p, &[]).await;

        assert!(!result.success);
        assert!(engine.api().calls().is_empty());
    }

    // -- Availability path -------------------------------------------------

    #[tokio::test]
    async fn availability_path_sends_minimal_update() {
        let engine = SyncEngine::new(ScriptedCatalog::default());
        let mut p = product("prod-001");
        p.out_of_stock = true;
        let result = engine.sync_availability(&ctx_with_catalog(), &p).await;

        assert!(result.success);
        assert_eq!(
            engine.api().calls(),
            vec!["availability:prod-001:OutOfStock"]
        );
    }

    // -- Deletion ----------------------------------------------------------

    #[tokio::test]
    async fn delete_issues_removal_by_retailer_id() {
        let engine = SyncEngine::new(ScriptedCatalog::default());
        let result = engine
            .delete_product(&ctx_with_catalog(), &product("prod-001"))
            .await;

        assert!(result.success);
        assert_eq!(result.action, SyncAction::Delete);
        assert_eq!(engine.api().calls(), vec!["delete:prod-001"]);
    }

    #[tokio::test]
    async fn delete_without_catalog_is_a_skip() {
        let engine = SyncEngine::new(ScriptedCatalog::default());
        let result = engine
            .delete_product(&ctx_without_catalog(), &product("prod-001"))
            .await;

        assert_eq!(result.action, SyncAction::Skip);
        assert!(engine.api().calls().is_empty());
    }

    // -- Batch -------------------------------------------------------------

    #[tokio::test]
    async fn empty_batch_returns_zeroes_without_calls() {
        let engine = SyncEngine::new(ScriptedCatalog::default());
        let result = engine.sync_batch(&ctx_with_catalog(), &[], None).await;

        assert_eq!(result.synced, 0);
        assert_eq!(result.failed, 0);
        assert_eq!(result.skipped, 0);
        assert!(engine.api().calls().is_empty());
    }

    #[tokio::test]
    async fn batch_submits_eligible_products_once() {
        let engine = SyncEngine::new(ScriptedCatalog::default());
        let mut inactive = product("prod-002");
        inactive.active = false;
        let items = vec![
            (product("prod-001"), vec![]),
            (inactive, vec![]),
            (product("prod-003"), vec![]),
        ];
        let result = engine.sync_batch(&ctx_with_catalog(), &items, None).await;

        assert_eq!(result.synced, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failed, 0);
        assert_eq!(result.batch_handle.as_deref(), Some("handle-1"));
        assert_eq!(engine.api().calls(), vec!["batch:cat-main:2"]);
    }

    #[tokio::test]
    async fn batch_counts_mapping_failures() {
        let engine = SyncEngine::new(ScriptedCatalog::default());
        let mut bad = product("prod-bad");
        bad.price = -5.0;
        let items = vec![(product("prod-001"), vec![]), (bad, vec![])];
        let result = engine.sync_batch(&ctx_with_catalog(), &items, None).await;

        assert_eq!(result.synced, 1);
        assert_eq!(result.failed, 1);
        assert!(result.errors[0].contains("prod-bad"));
    }

    #[tokio::test]
    async fn batch_without_catalog_skips_everything() {
        let engine = SyncEngine::new(ScriptedCatalog::default());
        let items = vec![(product("prod-001"), vec![])];
        let result = engine.sync_batch(&ctx_without_catalog(), &items, None).await;

        assert_eq!(result.skipped, 1);
        assert!(engine.api().calls().is_empty());
    }

    // -- Provisioning ------------------------------------------------------

    #[tokio::test]
    async fn provisioning_reports_partial_success() {
        let api = ScriptedCatalog {
            fail_catalog_names_containing: Some("Drinks".into()),
            ..Default::default()
        };
        let engine = SyncEngine::new(api);
        let categories = vec![
            category(1, "Tacos", true),
            category(2, "Drinks", true),
            category(3, "Retired", false),
        ];
        let result = engine
            .provision_category_catalogs(&ctx_with_catalog(), "owner-1", &categories)
            .await;

        assert_eq!(result.created.len(), 1);
        assert_eq!(result.created[0].category_id, 1);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].category_id, 2);
        assert!(result.failed[0].error.contains("catalog limit reached"));
    }

    #[tokio::test]
    async fn provisioning_skips_already_mapped_categories() {
        let engine = SyncEngine::new(ScriptedCatalog::default());
        let ctx = TenantContext {
            business: business(
                serde_json::json!([]),
                serde_json::json!({"1": "cat-existing"}),
            ),
            access_token: "token".into(),
            degraded: false,
        };
        let result = engine
            .provision_category_catalogs(&ctx, "owner-1", &[category(1, "Tacos", true)])
            .await;

        assert!(result.created.is_empty());
        assert!(result.failed.is_empty());
        assert!(engine.api().calls().is_empty());
    }
}
