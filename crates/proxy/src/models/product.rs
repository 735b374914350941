//! Product domain types.

use shop_persona_core::{Price, ProductId};

/// A product as the proxy sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: ProductId,
    pub title: String,
    pub handle: String,
    /// Price of the first variant, `0.00` when there is none.
    pub price: Price,
    /// URL of the first image.
    pub image_url: Option<String>,
    /// Active and the first variant is available for sale.
    pub available: bool,
}

/// Input for creating a product with a single variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCreateRequest {
    pub title: String,
    pub handle: String,
    pub price: Price,
    pub image_url: Option<String>,
    pub description: Option<String>,
}
