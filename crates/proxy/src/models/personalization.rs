//! The personalization payload returned to the storefront.

use serde::Serialize;
use shop_persona_core::{Price, ProductId};

use super::ProductRecord;

/// Personalization data for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonalizationResult {
    /// The `user_id` exactly as the caller sent it.
    pub user_id: String,
    pub first_name: String,
    pub profile_image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_product: Option<AssignedProduct>,
}

/// Product block of [`PersonalizationResult`].
///
/// A missing image is rendered as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedProduct {
    pub id: ProductId,
    pub title: String,
    pub handle: String,
    pub price: Price,
    pub image_url: String,
    pub available: bool,
}

impl From<ProductRecord> for AssignedProduct {
    fn from(product: ProductRecord) -> Self {
        Self {
            id: product.id,
            title: product.title,
            handle: product.handle,
            price: product.price,
            image_url: product.image_url.unwrap_or_default(),
            available: product.available,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serializes_missing_image_as_empty_string() {
        let product = ProductRecord {
            id: ProductId::new(0),
            title: "Featured Product".to_string(),
            handle: "featured-product".to_string(),
            price: Price::ZERO,
            image_url: None,
            available: false,
        };
        let result = PersonalizationResult {
            user_id: "42".to_string(),
            first_name: "Valued Customer".to_string(),
            profile_image_url: "/assets/default-avatar.png".to_string(),
            assigned_product: Some(product.into()),
        };

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "user_id": "42",
                "first_name": "Valued Customer",
                "profile_image_url": "/assets/default-avatar.png",
                "assigned_product": {
                    "id": 0,
                    "title": "Featured Product",
                    "handle": "featured-product",
                    "price": "0.00",
                    "image_url": "",
                    "available": false
                }
            })
        );
    }

    #[test]
    fn test_omits_absent_product() {
        let result = PersonalizationResult {
            user_id: "1".to_string(),
            first_name: "Ann".to_string(),
            profile_image_url: "https://cdn.example.com/a.png".to_string(),
            assigned_product: None,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("assigned_product").is_none());
    }
}
