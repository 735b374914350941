//! Wire DTOs for the Admin API.
//!
//! One response type per query or REST call, decoded at the client boundary.
//! Request payload types serialize to the exact REST shapes Shopify expects.

use serde::{Deserialize, Serialize};
use shop_persona_core::ProductStatus;

// =============================================================================
// Connections
// =============================================================================

/// A Relay-style connection.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

impl<T> Connection<T> {
    /// The first node, if the connection is non-empty.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.edges.first().map(|e| &e.node)
    }

    /// Consume the connection, returning its first node.
    #[must_use]
    pub fn into_first(self) -> Option<T> {
        self.edges.into_iter().next().map(|e| e.node)
    }
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

// =============================================================================
// GetCustomer
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerQueryData {
    pub customer: Option<CustomerNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerNode {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// =============================================================================
// GetProduct / GetDefaultProduct
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ProductQueryData {
    pub product: Option<ProductNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductsQueryData {
    #[serde(default)]
    pub products: Connection<ProductNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductNode {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub status: ProductStatus,
    #[serde(default)]
    pub variants: Connection<VariantNode>,
    #[serde(default)]
    pub images: Connection<ImageNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantNode {
    pub price: String,
    #[serde(default)]
    pub available_for_sale: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageNode {
    pub url: String,
}

// =============================================================================
// REST: metafields
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct MetafieldsResponse {
    #[serde(default)]
    pub metafields: Vec<Metafield>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Metafield {
    pub namespace: String,
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Metafield {
    /// The value as trimmed text; `None` when null or blank.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let text = match &self.value {
            serde_json::Value::Null => return None,
            serde_json::Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Metafield entry in a create payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewMetafield {
    pub namespace: String,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
}

// =============================================================================
// REST: customers
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CustomerCreatePayload {
    pub customer: NewCustomer,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub verified_email: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metafields: Vec<NewMetafield>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerCreateResponse {
    #[serde(default)]
    pub customer: Option<CreatedResource>,
}

/// The part of a REST create response we read back.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResource {
    #[serde(default)]
    pub id: Option<i64>,
}

// =============================================================================
// REST: products
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ProductCreatePayload {
    pub product: NewProduct,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub title: String,
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    pub status: &'static str,
    pub variants: Vec<NewVariant>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<NewImage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewVariant {
    pub price: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewImage {
    pub src: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreateResponse {
    #[serde(default)]
    pub product: Option<CreatedResource>,
}
