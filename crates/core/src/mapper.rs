//! Pure mapping from internal product records to the external commerce
//! catalog's product representation.
//!
//! No I/O happens here: the sync engine feeds a [`ProductView`] in and
//! sends the resulting [`ExternalProduct`] over the wire. Price and
//! availability rules live in one place so both the single-product and
//! batch paths agree.

use serde::{Deserialize, Serialize};

/// Substituted when a product has no image. The external catalog
/// rejects items without one, and a missing image must never block sync.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://cdn.comanda.app/assets/product-placeholder.png";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Validation failures raised before any network call is attempted.
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    /// Price is negative or not a finite number.
    #[error("Invalid price for product '{retailer_id}': {price}")]
    InvalidPrice { retailer_id: String, price: f64 },

    /// The product has no external-facing retailer id.
    #[error("Product has no retailer id")]
    MissingRetailerId,
}

// ---------------------------------------------------------------------------
// Input view
// ---------------------------------------------------------------------------

/// Read-only snapshot of a product as the mapper needs it.
///
/// Decoupled from the persistence model: the db crate converts its rows
/// into this view, keeping the mapper free of sqlx types.
#[derive(Debug, Clone)]
pub struct ProductView {
    /// Stable external-facing id; the join key with the external catalog.
    pub retailer_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Base price in decimal currency units.
    pub price: f64,
    /// ISO 4217 code, e.g. `"MXN"`.
    pub currency: String,
    pub active: bool,
    pub available: bool,
    pub out_of_stock: bool,
    pub image_url: Option<String>,
    /// Purchasable variants with their own prices.
    pub presentations: Vec<PresentationView>,
}

/// A purchasable variant (size, portion) of a product.
#[derive(Debug, Clone)]
pub struct PresentationView {
    pub name: String,
    pub price: f64,
    pub active: bool,
}

/// Mapper behaviour switches.
#[derive(Debug, Clone, Default)]
pub struct MapperOptions {
    /// Compute a min/max price range across active presentations and
    /// annotate the description with it. Used for category-scoped
    /// batch syncs where variants matter to the shopper.
    pub include_price_range: bool,
}

// ---------------------------------------------------------------------------
// Output payload
// ---------------------------------------------------------------------------

/// Availability state in the external catalog.
///
/// Collapsed from the four internal booleans in strict priority order;
/// see [`Availability::from_flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Discontinued,
    OutOfStock,
    InStock,
    AvailableForOrder,
}

impl Availability {
    /// Collapse the internal flags into one external state.
    ///
    /// Priority order is load-bearing: an inactive product is
    /// `Discontinued` regardless of the stock flags.
    pub fn from_flags(active: bool, available: bool, out_of_stock: bool) -> Self {
        if !active {
            Availability::Discontinued
        } else if out_of_stock {
            Availability::OutOfStock
        } else if available {
            Availability::InStock
        } else {
            Availability::AvailableForOrder
        }
    }
}

/// Product payload in the external catalog's shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalProduct {
    pub retailer_id: String,
    pub name: String,
    pub description: String,
    /// Price in the smallest currency unit (cents).
    pub price: i64,
    pub currency: String,
    pub availability: Availability,
    pub image_url: String,
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Convert a decimal price to integer cents.
///
/// Fails on negative or non-finite values; this check must run before
/// any network call.
pub fn price_to_cents(retailer_id: &str, price: f64) -> Result<i64, MapperError> {
    if !price.is_finite() || price < 0.0 {
        return Err(MapperError::InvalidPrice {
            retailer_id: retailer_id.to_string(),
            price,
        });
    }
    Ok((price * 100.0).round() as i64)
}

/// Map an internal product to its external catalog representation.
pub fn map_to_external(
    product: &ProductView,
    opts: &MapperOptions,
) -> Result<ExternalProduct, MapperError> {
    if product.retailer_id.is_empty() {
        return Err(MapperError::MissingRetailerId);
    }

    let mut display_price = product.price;
    let mut description = product.description.clone().unwrap_or_default();

    if opts.include_price_range {
        if let Some((min, max)) = presentation_price_range(&product.presentations) {
            if max > min {
                display_price = min;
                description.push_str(&format!(" (from ${min:.2} to ${max:.2})"));
            }
        }
    }

    let price = price_to_cents(&product.retailer_id, display_price)?;

    Ok(ExternalProduct {
        retailer_id: product.retailer_id.clone(),
        name: product.name.clone(),
        description,
        price,
        currency: product.currency.clone(),
        availability: Availability::from_flags(
            product.active,
            product.available,
            product.out_of_stock,
        ),
        image_url: product
            .image_url
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
    })
}

/// Min/max price across active presentations, if any exist.
fn presentation_price_range(presentations: &[PresentationView]) -> Option<(f64, f64)> {
    let mut prices = presentations
        .iter()
        .filter(|p| p.active)
        .map(|p| p.price)
        .filter(|p| p.is_finite());

    let first = prices.next()?;
    let (min, max) = prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
    Some((min, max))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn base_product() -> ProductView {
        ProductView {
            retailer_id: "prod-001".into(),
            name: "Tacos al pastor".into(),
            description: Some("Three tacos with pineapple".into()),
            price: 19.99,
            currency: "MXN".into(),
            active: true,
            available: true,
            out_of_stock: false,
            image_url: Some("https://cdn.example.com/tacos.jpg".into()),
            presentations: vec![],
        }
    }

    // -- Price conversion --------------------------------------------------

    #[test]
    fn price_converts_to_cents() {
        let mapped = map_to_external(&base_product(), &MapperOptions::default()).unwrap();
        assert_eq!(mapped.price, 1999);
    }

    #[test]
    fn price_rounds_to_nearest_cent() {
        assert_eq!(price_to_cents("p", 10.005).unwrap(), 1001);
        assert_eq!(price_to_cents("p", 0.1 + 0.2).unwrap(), 30);
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut product = base_product();
        product.price = -1.0;
        let err = map_to_external(&product, &MapperOptions::default()).unwrap_err();
        assert_matches!(err, MapperError::InvalidPrice { .. });
    }

    #[test]
    fn non_finite_price_is_rejected() {
        assert_matches!(
            price_to_cents("p", f64::NAN).unwrap_err(),
            MapperError::InvalidPrice { .. }
        );
        assert_matches!(
            price_to_cents("p", f64::INFINITY).unwrap_err(),
            MapperError::InvalidPrice { .. }
        );
    }

    // -- Availability state machine ----------------------------------------

    #[test]
    fn inactive_is_always_discontinued() {
        for available in [false, true] {
            for out_of_stock in [false, true] {
                assert_eq!(
                    Availability::from_flags(false, available, out_of_stock),
                    Availability::Discontinued,
                );
            }
        }
    }

    #[test]
    fn active_out_of_stock_wins_over_available() {
        assert_eq!(
            Availability::from_flags(true, true, true),
            Availability::OutOfStock,
        );
        assert_eq!(
            Availability::from_flags(true, false, true),
            Availability::OutOfStock,
        );
    }

    #[test]
    fn active_available_is_in_stock() {
        assert_eq!(
            Availability::from_flags(true, true, false),
            Availability::InStock,
        );
    }

    #[test]
    fn active_unavailable_is_available_for_order() {
        assert_eq!(
            Availability::from_flags(true, false, false),
            Availability::AvailableForOrder,
        );
    }

    #[test]
    fn availability_serializes_snake_case() {
        let json = serde_json::to_string(&Availability::OutOfStock).unwrap();
        assert_eq!(json, r#""out_of_stock""#);
        let json = serde_json::to_string(&Availability::AvailableForOrder).unwrap();
        assert_eq!(json, r#""available_for_order""#);
    }

    // -- Price range mode --------------------------------------------------

    #[test]
    fn price_range_uses_minimum_and_annotates_description() {
        let mut product = base_product();
        product.presentations = vec![
            PresentationView { name: "Single".into(), price: 7.5, active: true },
            PresentationView { name: "Triple".into(), price: 19.99, active: true },
            PresentationView { name: "Retired".into(), price: 1.0, active: false },
        ];
        let opts = MapperOptions { include_price_range: true };
        let mapped = map_to_external(&product, &opts).unwrap();

        assert_eq!(mapped.price, 750);
        assert!(mapped.description.contains("from $7.50 to $19.99"));
    }

    #[test]
    fn price_range_is_noop_for_single_price() {
        let mut product = base_product();
        product.presentations = vec![
            PresentationView { name: "A".into(), price: 19.99, active: true },
            PresentationView { name: "B".into(), price: 19.99, active: true },
        ];
        let opts = MapperOptions { include_price_range: true };
        let mapped = map_to_external(&product, &opts).unwrap();

        assert_eq!(mapped.price, 1999);
        assert_eq!(mapped.description, "Three tacos with pineapple");
    }

    #[test]
    fn price_range_ignored_when_option_off() {
        let mut product = base_product();
        product.presentations = vec![
            PresentationView { name: "A".into(), price: 5.0, active: true },
            PresentationView { name: "B".into(), price: 9.0, active: true },
        ];
        let mapped = map_to_external(&product, &MapperOptions::default()).unwrap();
        assert_eq!(mapped.price, 1999);
    }

    // -- Image fallback ----------------------------------------------------

    #[test]
    fn missing_image_gets_placeholder() {
        let mut product = base_product();
        product.image_url = None;
        let mapped = map_to_external(&product, &MapperOptions::default()).unwrap();
        assert_eq!(mapped.image_url, PLACEHOLDER_IMAGE_URL);
    }

    #[test]
    fn empty_image_url_gets_placeholder() {
        let mut product = base_product();
        product.image_url = Some(String::new());
        let mapped = map_to_external(&product, &MapperOptions::default()).unwrap();
        assert_eq!(mapped.image_url, PLACEHOLDER_IMAGE_URL);
    }

    // -- Retailer id -------------------------------------------------------

    #[test]
    fn missing_retailer_id_is_rejected() {
        let mut product = base_product();
        product.retailer_id = String::new();
        assert_matches!(
            map_to_external(&product, &MapperOptions::default()).unwrap_err(),
            MapperError::MissingRetailerId
        );
    }
}
