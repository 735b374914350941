//! Conversions from Admin API DTOs to domain models.

use shop_persona_core::{CustomerId, Price, ProductId};
use tracing::warn;

use crate::models::{
    ASSIGNED_PRODUCT_KEY, METAFIELD_NAMESPACE, PROFILE_IMAGE_KEY, PersonalizationMetafields,
    ProductRecord,
};

use super::ApiError;
use super::types::{CustomerNode, Metafield, ProductNode};

/// Core customer fields, before metafields are merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerCore {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub email: Option<String>,
}

/// Convert a `GetCustomer` node.
///
/// # Errors
///
/// Returns `ApiError::MalformedId` if the node id is not a global id.
pub fn convert_customer(node: CustomerNode) -> Result<CustomerCore, ApiError> {
    let id = CustomerId::from_global_id(&node.id)?;
    let first_name = node.first_name.unwrap_or_default();
    let last_name = node.last_name.unwrap_or_default();
    let display_name = node
        .display_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("{first_name} {last_name}").trim().to_string());

    Ok(CustomerCore {
        id,
        first_name,
        last_name,
        display_name,
        email: node.email.filter(|e| !e.is_empty()),
    })
}

/// Convert a product node.
///
/// Price and availability come from the first variant; a product without
/// variants is priced `0.00` and unavailable.
///
/// # Errors
///
/// Returns `ApiError::MalformedId` for a bad id and `ApiError::InvalidPrice`
/// for an unparseable price.
pub fn convert_product(node: ProductNode) -> Result<ProductRecord, ApiError> {
    let id = ProductId::from_global_id(&node.id)?;
    let active = node.status.is_active();

    let (price, available_for_sale) = match node.variants.into_first() {
        Some(variant) => (Price::parse(&variant.price)?, variant.available_for_sale),
        None => (Price::ZERO, false),
    };

    Ok(ProductRecord {
        id,
        title: node.title,
        handle: node.handle,
        price,
        image_url: node.images.into_first().map(|image| image.url),
        available: active && available_for_sale,
    })
}

/// Extract the recognised personalization values from a metafield list.
///
/// Entries outside the personalization namespace, unknown keys and blank
/// values are ignored. An assigned product id may be numeric or a global id;
/// anything else is dropped with a warning.
#[must_use]
pub fn convert_metafields(metafields: &[Metafield]) -> PersonalizationMetafields {
    let mut result = PersonalizationMetafields::default();

    for field in metafields
        .iter()
        .filter(|f| f.namespace == METAFIELD_NAMESPACE)
    {
        let Some(value) = field.text() else {
            continue;
        };

        match field.key.as_str() {
            PROFILE_IMAGE_KEY => result.profile_image_url = Some(value),
            ASSIGNED_PRODUCT_KEY => match parse_product_ref(&value) {
                Some(id) => result.assigned_product_id = Some(id),
                None => warn!(value = %value, "Ignoring invalid assigned_product_id metafield"),
            },
            _ => {}
        }
    }

    result
}

fn parse_product_ref(value: &str) -> Option<ProductId> {
    let id = if value.starts_with("gid://") {
        ProductId::from_global_id(value).ok()?
    } else {
        ProductId::new(value.parse().ok()?)
    };
    (id.as_i64() > 0).then_some(id)
}
