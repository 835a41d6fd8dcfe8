//! Product and presentation (variant) models.

use comanda_core::mapper::{PresentationView, ProductView};
use comanda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// A row from the `products` table.
///
/// `retailer_id` is the immutable, tenant-scoped external-facing id:
/// the join key with the external commerce catalog.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub business_id: DbId,
    pub category_id: Option<DbId>,
    pub retailer_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Base price in decimal currency units.
    pub price: f64,
    pub currency: String,
    pub active: bool,
    pub available: bool,
    pub out_of_stock: bool,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    /// Snapshot this row (plus its presentations) into the mapper's
    /// read-only view.
    pub fn to_view(&self, presentations: &[Presentation]) -> ProductView {
        ProductView {
            retailer_id: self.retailer_id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            currency: self.currency.clone(),
            active: self.active,
            available: self.available,
            out_of_stock: self.out_of_stock,
            image_url: self.image_url.clone(),
            presentations: presentations
                .iter()
                .map(|p| PresentationView {
                    name: p.name.clone(),
                    price: p.price,
                    active: p.active,
                })
                .collect(),
        }
    }
}

/// A row from the `presentations` table: a purchasable variant.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Presentation {
    pub id: DbId,
    pub product_id: DbId,
    pub name: String,
    pub price: f64,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Request body for creating a product.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProduct {
    pub category_id: Option<DbId>,
    /// Optional; generated from the name when absent.
    pub retailer_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: f64,
    /// Defaults to the tenant's currency (`MXN`).
    pub currency: Option<String>,
    pub image_url: Option<String>,
}

/// Request body for partially updating a product.
///
/// `retailer_id` is deliberately absent: it is immutable.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProduct {
    pub category_id: Option<DbId>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub active: Option<bool>,
    pub available: Option<bool>,
    pub out_of_stock: Option<bool>,
    pub image_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn create_product_rejects_negative_price() {
        let input = CreateProduct {
            category_id: None,
            retailer_id: None,
            name: "Tacos".into(),
            description: None,
            price: -1.0,
            currency: None,
            image_url: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn create_product_rejects_empty_name() {
        let input = CreateProduct {
            category_id: None,
            retailer_id: None,
            name: String::new(),
            description: None,
            price: 10.0,
            currency: None,
            image_url: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn to_view_carries_presentations() {
        let now = chrono::Utc::now();
        let product = Product {
            id: 1,
            business_id: 1,
            category_id: Some(2),
            retailer_id: "prod-001".into(),
            name: "Tacos".into(),
            description: None,
            price: 19.99,
            currency: "MXN".into(),
            active: true,
            available: true,
            out_of_stock: false,
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        let presentations = vec![Presentation {
            id: 10,
            product_id: 1,
            name: "Triple".into(),
            price: 25.0,
            active: true,
            created_at: now,
            updated_at: now,
        }];

        let view = product.to_view(&presentations);
        assert_eq!(view.retailer_id, "prod-001");
        assert_eq!(view.presentations.len(), 1);
        assert_eq!(view.presentations[0].price, 25.0);
    }
}
