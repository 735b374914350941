//! Customer reads and writes.
//!
//! Core customer fields come from GraphQL. Personalization metafields are read
//! over REST and are best-effort: when they cannot be loaded the customer is
//! still returned, just without a profile image or assigned product.

use reqwest::Method;
use serde_json::json;
use shop_persona_core::{CustomerId, ProductId};
use tracing::{debug, instrument, warn};

use crate::models::{
    ASSIGNED_PRODUCT_KEY, CustomerCreateRequest, CustomerRecord, METAFIELD_NAMESPACE,
    METAFIELD_TYPE, PROFILE_IMAGE_KEY, PersonalizationMetafields, ProductRecord,
};
use crate::shopify::conversions::{convert_customer, convert_metafields};
use crate::shopify::queries::{GET_CUSTOMER, GET_CUSTOMER_OPERATION};
use crate::shopify::types::{
    CustomerCreatePayload, CustomerCreateResponse, CustomerQueryData, MetafieldsResponse,
    NewCustomer, NewMetafield,
};
use crate::shopify::{ApiClient, ApiError, Session};

use super::ProductService;

const GET_METAFIELDS_OPERATION: &str = "GetCustomerMetafields";
const CREATE_CUSTOMER_OPERATION: &str = "CreateCustomer";

/// Customer operations against the Admin API.
#[derive(Clone)]
pub struct CustomerService {
    client: ApiClient,
    products: ProductService,
}

impl CustomerService {
    #[must_use]
    pub const fn new(client: ApiClient, products: ProductService) -> Self {
        Self { client, products }
    }

    /// Get a customer by numeric id, with personalization data resolved.
    ///
    /// `Ok(None)` when the customer does not exist. Metafield and assigned
    /// product lookups never fail the call.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer query fails or its id is malformed.
    #[instrument(skip(self, session), fields(customer_id = %id))]
    pub async fn get_by_id(
        &self,
        session: &Session,
        id: CustomerId,
    ) -> Result<Option<CustomerRecord>, ApiError> {
        let data: CustomerQueryData = self
            .client
            .graphql_call(
                session,
                GET_CUSTOMER,
                json!({ "id": id.to_global_id() }),
                GET_CUSTOMER_OPERATION,
            )
            .await?;

        let Some(node) = data.customer else {
            debug!("Customer not found");
            return Ok(None);
        };
        let core = convert_customer(node)?;

        let metafields = self.metafields(session, core.id).await;
        let assigned_product = match metafields.assigned_product_id {
            Some(product_id) => self.resolve_assigned_product(session, product_id).await,
            None => None,
        };

        Ok(Some(CustomerRecord {
            id: core.id,
            first_name: core.first_name,
            last_name: core.last_name,
            display_name: core.display_name,
            email: core.email,
            profile_image_url: metafields.profile_image_url,
            assigned_product_id: metafields.assigned_product_id,
            assigned_product,
        }))
    }

    /// Read the customer's personalization metafields.
    ///
    /// Never fails; on error the result is empty and a warning is logged.
    #[instrument(skip(self, session), fields(customer_id = %id))]
    pub async fn metafields(&self, session: &Session, id: CustomerId) -> PersonalizationMetafields {
        let path = format!("customers/{id}/metafields?namespace={METAFIELD_NAMESPACE}");
        let result: Result<MetafieldsResponse, ApiError> = self
            .client
            .rest_call(session, Method::GET, &path, None, GET_METAFIELDS_OPERATION)
            .await;

        match result {
            Ok(response) => convert_metafields(&response.metafields),
            Err(e) => {
                warn!(error = %e, "Failed to read customer metafields");
                PersonalizationMetafields::default()
            }
        }
    }

    async fn resolve_assigned_product(
        &self,
        session: &Session,
        product_id: ProductId,
    ) -> Option<ProductRecord> {
        match self.products.get_by_id(session, product_id).await {
            Ok(Some(product)) => Some(product),
            Ok(None) => {
                warn!(product_id = %product_id, "Assigned product does not exist");
                None
            }
            Err(e) => {
                warn!(product_id = %product_id, error = %e, "Failed to load assigned product");
                None
            }
        }
    }

    /// Create a customer, attaching personalization metafields for the
    /// fields that are set.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response has no id.
    #[instrument(skip(self, session, request), fields(email = %request.email))]
    pub async fn create(
        &self,
        session: &Session,
        request: &CustomerCreateRequest,
    ) -> Result<CustomerId, ApiError> {
        let payload = CustomerCreatePayload {
            customer: NewCustomer {
                first_name: request.first_name.clone(),
                last_name: request.last_name.clone(),
                email: request.email.clone(),
                verified_email: true,
                metafields: personalization_metafields(request),
            },
        };
        let body = serde_json::to_value(&payload).map_err(|source| ApiError::Json {
            operation: CREATE_CUSTOMER_OPERATION.to_string(),
            source,
        })?;

        let response: CustomerCreateResponse = self
            .client
            .rest_call(
                session,
                Method::POST,
                "customers",
                Some(&body),
                CREATE_CUSTOMER_OPERATION,
            )
            .await?;

        response
            .customer
            .and_then(|c| c.id)
            .map(CustomerId::new)
            .ok_or_else(|| {
                ApiError::CreationFailed(format!(
                    "customer '{}' response had no id",
                    request.email
                ))
            })
    }
}

fn personalization_metafields(request: &CustomerCreateRequest) -> Vec<NewMetafield> {
    let metafield = |key: &str, value: String| NewMetafield {
        namespace: METAFIELD_NAMESPACE.to_string(),
        key: key.to_string(),
        value,
        kind: METAFIELD_TYPE.to_string(),
    };

    let mut metafields = Vec::new();
    if let Some(url) = request
        .profile_image_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
    {
        metafields.push(metafield(PROFILE_IMAGE_KEY, url.to_string()));
    }
    if let Some(product_id) = request.assigned_product_id {
        metafields.push(metafield(ASSIGNED_PRODUCT_KEY, product_id.to_string()));
    }
    metafields
}
