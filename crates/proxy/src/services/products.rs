//! Product reads and writes.

use reqwest::Method;
use serde_json::json;
use shop_persona_core::{Price, ProductId};
use tracing::{debug, instrument, warn};

use crate::models::{ProductCreateRequest, ProductRecord};
use crate::shopify::conversions::convert_product;
use crate::shopify::queries::{
    GET_DEFAULT_PRODUCT, GET_DEFAULT_PRODUCT_OPERATION, GET_PRODUCT, GET_PRODUCT_BY_HANDLE,
    GET_PRODUCT_BY_HANDLE_OPERATION, GET_PRODUCT_OPERATION,
};
use crate::shopify::types::{
    NewImage, NewProduct, NewVariant, ProductCreatePayload, ProductCreateResponse,
    ProductQueryData, ProductsQueryData,
};
use crate::shopify::{ApiClient, ApiError, Session};

const CREATE_PRODUCT_OPERATION: &str = "CreateProduct";

/// Product operations against the Admin API.
#[derive(Clone)]
pub struct ProductService {
    client: ApiClient,
}

impl ProductService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Get a product by numeric id. `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the product cannot be
    /// converted.
    #[instrument(skip(self, session), fields(product_id = %id))]
    pub async fn get_by_id(
        &self,
        session: &Session,
        id: ProductId,
    ) -> Result<Option<ProductRecord>, ApiError> {
        let data: ProductQueryData = self
            .client
            .graphql_call(
                session,
                GET_PRODUCT,
                json!({ "id": id.to_global_id() }),
                GET_PRODUCT_OPERATION,
            )
            .await?;

        data.product.map(convert_product).transpose()
    }

    /// Get a product by handle. `Ok(None)` when no product has it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the product cannot be
    /// converted.
    #[instrument(skip(self, session))]
    pub async fn get_by_handle(
        &self,
        session: &Session,
        handle: &str,
    ) -> Result<Option<ProductRecord>, ApiError> {
        let data: ProductsQueryData = self
            .client
            .graphql_call(
                session,
                GET_PRODUCT_BY_HANDLE,
                json!({ "query": format!("handle:{handle}") }),
                GET_PRODUCT_BY_HANDLE_OPERATION,
            )
            .await?;

        // Search is fuzzy on some fields; only an exact handle counts.
        data.products
            .edges
            .into_iter()
            .map(|edge| edge.node)
            .find(|node| node.handle == handle)
            .map(convert_product)
            .transpose()
    }

    /// Get the store's default product: the first active one.
    ///
    /// Never fails; errors are logged and reported as `None`.
    #[instrument(skip(self, session))]
    pub async fn get_default(&self, session: &Session) -> Option<ProductRecord> {
        match self.try_get_default(session).await {
            Ok(product) => product,
            Err(e) => {
                warn!(error = %e, "Failed to load default product");
                None
            }
        }
    }

    /// Like [`Self::get_default`], but surfaces errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the product cannot be
    /// converted.
    pub async fn try_get_default(
        &self,
        session: &Session,
    ) -> Result<Option<ProductRecord>, ApiError> {
        let data: ProductsQueryData = self
            .client
            .graphql_call(
                session,
                GET_DEFAULT_PRODUCT,
                json!({}),
                GET_DEFAULT_PRODUCT_OPERATION,
            )
            .await?;

        let product = data.products.into_first().map(convert_product).transpose()?;
        if product.is_none() {
            debug!("Store has no active products");
        }
        Ok(product)
    }

    /// Create a product with one variant and, optionally, one image.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response has no id.
    #[instrument(skip(self, session, request), fields(handle = %request.handle))]
    pub async fn create(
        &self,
        session: &Session,
        request: &ProductCreateRequest,
    ) -> Result<ProductId, ApiError> {
        let payload = ProductCreatePayload {
            product: NewProduct {
                title: request.title.clone(),
                handle: request.handle.clone(),
                body_html: request.description.clone(),
                status: "active",
                variants: vec![NewVariant {
                    price: request.price.to_string(),
                }],
                images: request
                    .image_url
                    .iter()
                    .filter(|url| !url.is_empty())
                    .map(|url| NewImage { src: url.clone() })
                    .collect(),
            },
        };
        let body = serde_json::to_value(&payload).map_err(|source| ApiError::Json {
            operation: CREATE_PRODUCT_OPERATION.to_string(),
            source,
        })?;

        let response: ProductCreateResponse = self
            .client
            .rest_call(
                session,
                Method::POST,
                "products",
                Some(&body),
                CREATE_PRODUCT_OPERATION,
            )
            .await?;

        response
            .product
            .and_then(|p| p.id)
            .map(ProductId::new)
            .ok_or_else(|| {
                ApiError::CreationFailed(format!(
                    "product '{}' response had no id",
                    request.handle
                ))
            })
    }

    /// Placeholder product used when nothing else is available.
    #[must_use]
    pub fn default_fallback() -> ProductRecord {
        ProductRecord {
            id: ProductId::new(0),
            title: "Featured Product".to_string(),
            handle: "featured-product".to_string(),
            price: Price::ZERO,
            image_url: None,
            available: false,
        }
    }
}
