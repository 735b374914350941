//! Customer domain types.

use shop_persona_core::{CustomerId, ProductId};

use super::ProductRecord;

/// Metafield namespace holding personalization data.
pub const METAFIELD_NAMESPACE: &str = "personalization";

/// Metafield key for the customer's avatar URL.
pub const PROFILE_IMAGE_KEY: &str = "profile_image_url";

/// Metafield key for the customer's assigned product (numeric id).
pub const ASSIGNED_PRODUCT_KEY: &str = "assigned_product_id";

/// Metafield type used when writing personalization values.
pub const METAFIELD_TYPE: &str = "single_line_text_field";

/// A customer with its personalization data resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub email: Option<String>,
    pub profile_image_url: Option<String>,
    pub assigned_product_id: Option<ProductId>,
    /// The assigned product, when it could be loaded.
    pub assigned_product: Option<ProductRecord>,
}

/// The recognised personalization metafields of one customer.
///
/// Both fields are absent when the metafields could not be read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalizationMetafields {
    pub profile_image_url: Option<String>,
    pub assigned_product_id: Option<ProductId>,
}

impl PersonalizationMetafields {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.profile_image_url.is_none() && self.assigned_product_id.is_none()
    }
}

/// Input for creating a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerCreateRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub profile_image_url: Option<String>,
    pub assigned_product_id: Option<ProductId>,
}
