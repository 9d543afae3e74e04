//! Wire types for the storefront REST API.
//!
//! Field names follow the API's camelCase JSON. Collection endpoints wrap
//! their items in a HAL envelope whose `_embedded` key varies per resource.

use std::collections::HashMap;

use meme_shop_core::{CategoryId, CountryId, Price, ProductId, StateId};
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog Types
// =============================================================================

/// A product as returned by the catalog API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub sku: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub unit_price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub units_in_stock: Option<i64>,
}

const fn default_active() -> bool {
    true
}

/// A product category (menu entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    pub id: CategoryId,
    pub category_name: String,
}

/// Pagination metadata of a collection response.
///
/// `number` is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub size: u32,
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    pub number: u32,
}

/// One page of products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: PageInfo,
}

/// HAL collection envelope: `{"_embedded": {"<key>": [...]}, "page": {...}}`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct HalCollection<T> {
    #[serde(rename = "_embedded", default)]
    embedded: HashMap<String, Vec<T>>,
    #[serde(default)]
    page: Option<PageInfo>,
}

impl<T> HalCollection<T> {
    /// Take the items embedded under `key`; a missing key means no items.
    pub(crate) fn take(&mut self, key: &str) -> Vec<T> {
        self.embedded.remove(key).unwrap_or_default()
    }

    pub(crate) const fn page(&self) -> Option<PageInfo> {
        self.page
    }
}

// =============================================================================
// Reference Data Types
// =============================================================================

/// A country selectable in an address section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    /// ISO 3166-1 alpha-2 code, used to look up states.
    pub code: String,
    pub name: String,
}

/// A state or province of a country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub name: String,
}

// =============================================================================
// Order Types
// =============================================================================

/// Everything the order API needs to place an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub customer: Customer,
    pub billing_address: Address,
    pub order: Order,
    pub order_items: Vec<OrderItem>,
}

/// Customer contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Postal address with state and country given by display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

/// Order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub total_quantity: u32,
    pub total_price: Price,
}

/// One ordered product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub image_url: Option<String>,
    pub unit_price: Price,
    pub quantity: u32,
    pub product_id: ProductId,
}

/// Response of a successful order placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub order_tracking_number: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_page_envelope() {
        let json = r#"{
            "_embedded": {
                "products": [{
                    "id": 7,
                    "sku": "MEME-1007",
                    "name": "Doge Mug",
                    "description": "Such mug",
                    "unitPrice": 18.99,
                    "imageUrl": "assets/images/products/mug.png",
                    "active": true,
                    "unitsInStock": 100,
                    "dateCreated": "2024-01-01T00:00:00.000+00:00"
                }]
            },
            "page": {"size": 8, "totalElements": 9, "totalPages": 2, "number": 1}
        }"#;

        let mut envelope: HalCollection<Product> = serde_json::from_str(json).unwrap();
        let products = envelope.take("products");

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, ProductId::new(7));
        assert_eq!(products[0].unit_price, Price::from_cents(1899));
        assert_eq!(
            envelope.page(),
            Some(PageInfo {
                size: 8,
                total_elements: 9,
                total_pages: 2,
                number: 1,
            })
        );
    }

    #[test]
    fn test_envelope_without_embedded_is_empty() {
        let mut envelope: HalCollection<Country> = serde_json::from_str("{}").unwrap();
        assert!(envelope.take("countries").is_empty());
        assert!(envelope.page().is_none());
    }

    #[test]
    fn test_purchase_uses_camel_case_and_numbers() {
        let purchase = Purchase {
            customer: Customer {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
            },
            billing_address: Address {
                street: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                state: "Ontario".to_string(),
                country: "Canada".to_string(),
                zip_code: "K1A0B1".to_string(),
            },
            order: Order {
                total_quantity: 3,
                total_price: Price::from_cents(4500),
            },
            order_items: vec![OrderItem {
                image_url: None,
                unit_price: Price::from_cents(1500),
                quantity: 3,
                product_id: ProductId::new(1),
            }],
        };

        let value = serde_json::to_value(&purchase).unwrap();
        assert_eq!(value["billingAddress"]["zipCode"], "K1A0B1");
        assert_eq!(value["billingAddress"]["state"], "Ontario");
        assert_eq!(value["order"]["totalQuantity"], 3);
        assert_eq!(value["order"]["totalPrice"], 45.0);
        assert_eq!(value["orderItems"][0]["productId"], 1);
    }
}
