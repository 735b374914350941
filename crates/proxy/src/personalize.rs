//! Personalization for one storefront request.
//!
//! Resolution order for the product block:
//!
//! 1. The customer's assigned product
//! 2. The store's first active product
//! 3. [`ProductService::default_fallback`]
//!
//! Profile fields fall back to [`PersonalizationDefaults`] when the customer
//! has none.

use shop_persona_core::{CustomerId, GLOBAL_ID_PREFIX};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::PersonalizationDefaults;
use crate::models::{PersonalizationResult, ProductRecord};
use crate::services::{CustomerService, ProductService};
use crate::shopify::{ApiClient, ApiError, Session};

/// Why a personalization request failed.
#[derive(Debug, Error)]
pub enum PersonalizeError {
    #[error("Invalid or missing user_id parameter")]
    InvalidInput,

    #[error("Customer not found")]
    CustomerNotFound,

    #[error(transparent)]
    Upstream(#[from] ApiError),
}

/// Where the product block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSource {
    Assigned,
    StoreDefault,
    Fallback,
}

impl ProductSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::StoreDefault => "store_default",
            Self::Fallback => "fallback",
        }
    }
}

/// Builds [`PersonalizationResult`]s.
#[derive(Clone)]
pub struct Personalizer {
    customers: CustomerService,
    products: ProductService,
    defaults: PersonalizationDefaults,
}

impl Personalizer {
    #[must_use]
    pub fn new(client: ApiClient, defaults: PersonalizationDefaults) -> Self {
        let products = ProductService::new(client.clone());
        Self {
            customers: CustomerService::new(client, products.clone()),
            products,
            defaults,
        }
    }

    /// Personalize for `raw_user_id`, exactly as received from the caller.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the id is missing or unparseable,
    /// `CustomerNotFound` when no such customer exists, `Upstream` when the
    /// customer lookup itself fails.
    #[instrument(skip(self, session), fields(shop = %session.shop()))]
    pub async fn personalize(
        &self,
        session: &Session,
        raw_user_id: Option<&str>,
    ) -> Result<PersonalizationResult, PersonalizeError> {
        let raw = raw_user_id.unwrap_or_default();
        let customer_id = parse_user_id(raw).ok_or(PersonalizeError::InvalidInput)?;

        let customer = self
            .customers
            .get_by_id(session, customer_id)
            .await?
            .ok_or(PersonalizeError::CustomerNotFound)?;

        let (product, source) = match customer.assigned_product {
            Some(product) => (product, ProductSource::Assigned),
            None => self.default_product(session).await,
        };

        info!(
            customer_id = %customer_id,
            product_id = %product.id,
            product_source = source.as_str(),
            "Personalization resolved"
        );

        Ok(PersonalizationResult {
            user_id: raw.to_string(),
            first_name: non_empty(customer.first_name)
                .unwrap_or_else(|| self.defaults.first_name.clone()),
            profile_image_url: customer
                .profile_image_url
                .and_then(non_empty)
                .unwrap_or_else(|| self.defaults.avatar_url.clone()),
            assigned_product: Some(product.into()),
        })
    }

    async fn default_product(&self, session: &Session) -> (ProductRecord, ProductSource) {
        if let Some(product) = self.products.get_default(session).await {
            return (product, ProductSource::StoreDefault);
        }
        debug!("No default product, using fallback");
        (ProductService::default_fallback(), ProductSource::Fallback)
    }
}

/// Parse a `user_id` parameter: a positive integer or a customer global id.
#[must_use]
pub fn parse_user_id(raw: &str) -> Option<CustomerId> {
    let raw = raw.trim();
    let customer_prefix = format!("{GLOBAL_ID_PREFIX}/{}/", CustomerId::RESOURCE_TYPE);

    let id = if raw.starts_with(&customer_prefix) {
        CustomerId::from_global_id(raw).ok()?
    } else {
        CustomerId::new(raw.parse().ok()?)
    };
    (id.as_i64() > 0).then_some(id)
}

fn non_empty(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}
