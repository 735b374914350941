//! Integration tests for Shop Persona.
//!
//! Every test runs the real router and services against an `httpmock`
//! server standing in for the store's Admin API. No credentials or network
//! access are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shop-persona-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `personalize` - End-to-end `/proxy/personalize` scenarios
//! - `seeding` - Seed runs with created, existing and failing entries

use std::net::{IpAddr, Ipv4Addr};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode},
};
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::{Value, json};
use tower::ServiceExt;

use shop_persona_proxy::config::{ApiConfig, PersonalizationDefaults, ProxyConfig};
use shop_persona_proxy::routes;
use shop_persona_proxy::shopify::{ACCESS_TOKEN_HEADER, ApiClient, RetryPolicy, Session};
use shop_persona_proxy::state::AppState;

/// Access token the mock store expects.
pub const ACCESS_TOKEN: &str = "shpat_integration";

/// Admin API root on the mock store.
pub const API_ROOT: &str = "/admin/api/2026-01";

/// A mock Admin API.
pub struct MockStore {
    pub server: MockServer,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::start()
    }
}

impl MockStore {
    #[must_use]
    pub fn start() -> Self {
        Self {
            server: MockServer::start(),
        }
    }

    #[must_use]
    pub fn graphql_path() -> String {
        format!("{API_ROOT}/graphql.json")
    }

    /// API configuration pointing at this store.
    ///
    /// # Panics
    ///
    /// Never; the fixed fields are all non-empty.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(
            "test-key",
            "test-secret",
            vec!["read_customers".to_string(), "write_products".to_string()],
            "persona.example.com",
        )
        .unwrap()
        .with_shop(self.server.base_url())
        .with_access_token(ACCESS_TOKEN)
    }

    #[must_use]
    pub fn proxy_config(&self, retry: RetryPolicy, expose_errors: bool) -> ProxyConfig {
        ProxyConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            shopify: self.api_config(),
            retry,
            expose_errors,
            defaults: PersonalizationDefaults::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Router wired to this store.
    #[must_use]
    pub fn app(&self, retry: RetryPolicy) -> Router {
        routes::router(AppState::new(self.proxy_config(retry, false)))
    }

    /// Router wired to this store, passing internal errors to clients.
    #[must_use]
    pub fn app_exposing_errors(&self, retry: RetryPolicy) -> Router {
        routes::router(AppState::new(self.proxy_config(retry, true)))
    }

    #[must_use]
    pub fn client(&self, retry: RetryPolicy) -> ApiClient {
        ApiClient::new(self.api_config(), retry)
    }

    #[must_use]
    pub fn session(&self) -> Session {
        ApiClient::create_session(self.server.base_url(), ACCESS_TOKEN)
    }

    /// `GetCustomer` for `id` answers with `customer` (`Value::Null` for a
    /// missing customer).
    pub fn mock_customer(&self, id: i64, customer: Value) -> Mock<'_> {
        self.server.mock(|when, then| {
            when.method(POST)
                .path(Self::graphql_path())
                .header(ACCESS_TOKEN_HEADER, ACCESS_TOKEN)
                .body_includes(r#""operationName":"GetCustomer""#)
                .body_includes(format!("gid://shopify/Customer/{id}"));
            then.status(200)
                .json_body(json!({"data": {"customer": customer}}));
        })
    }

    /// `GetCustomer` for `id` answers with `status`.
    pub fn mock_customer_status(&self, id: i64, status: u16) -> Mock<'_> {
        self.server.mock(|when, then| {
            when.method(POST)
                .path(Self::graphql_path())
                .body_includes(r#""operationName":"GetCustomer""#)
                .body_includes(format!("gid://shopify/Customer/{id}"));
            then.status(status).body("upstream unavailable");
        })
    }

    /// Metafield read for customer `id` answers with `metafields`.
    pub fn mock_metafields(&self, id: i64, metafields: Value) -> Mock<'_> {
        self.server.mock(|when, then| {
            when.method(GET)
                .path(format!("{API_ROOT}/customers/{id}/metafields.json"))
                .query_param("namespace", "personalization")
                .header(ACCESS_TOKEN_HEADER, ACCESS_TOKEN);
            then.status(200)
                .json_body(json!({"metafields": metafields}));
        })
    }

    /// Metafield read for customer `id` answers with `status`.
    pub fn mock_metafields_status(&self, id: i64, status: u16) -> Mock<'_> {
        self.server.mock(|when, then| {
            when.method(GET)
                .path(format!("{API_ROOT}/customers/{id}/metafields.json"));
            then.status(status).json_body(json!({"errors": "unavailable"}));
        })
    }

    /// `GetProduct` for `id` answers with `product`.
    pub fn mock_product(&self, id: i64, product: Value) -> Mock<'_> {
        self.server.mock(|when, then| {
            when.method(POST)
                .path(Self::graphql_path())
                .body_includes(r#""operationName":"GetProduct""#)
                .body_includes(format!("gid://shopify/Product/{id}"));
            then.status(200)
                .json_body(json!({"data": {"product": product}}));
        })
    }

    /// `GetDefaultProduct` answers with `products` as its only edges.
    pub fn mock_default_products(&self, products: &[Value]) -> Mock<'_> {
        let edges: Vec<Value> = products.iter().map(|p| json!({"node": p})).collect();
        self.server.mock(|when, then| {
            when.method(POST)
                .path(Self::graphql_path())
                .body_includes(r#""operationName":"GetDefaultProduct""#);
            then.status(200)
                .json_body(json!({"data": {"products": {"edges": edges}}}));
        })
    }

    /// `GetProductByHandle` for `handle` answers with `products`.
    pub fn mock_product_by_handle(&self, handle: &str, products: &[Value]) -> Mock<'_> {
        let edges: Vec<Value> = products.iter().map(|p| json!({"node": p})).collect();
        self.server.mock(|when, then| {
            when.method(POST)
                .path(Self::graphql_path())
                .body_includes(r#""operationName":"GetProductByHandle""#)
                .body_includes(format!("handle:{handle}"));
            then.status(200)
                .json_body(json!({"data": {"products": {"edges": edges}}}));
        })
    }

    /// `GetDefaultProduct` answers with `status`.
    pub fn mock_default_products_status(&self, status: u16) -> Mock<'_> {
        self.server.mock(|when, then| {
            when.method(POST)
                .path(Self::graphql_path())
                .body_includes(r#""operationName":"GetDefaultProduct""#);
            then.status(status);
        })
    }
}

/// A `GetCustomer` node.
#[must_use]
pub fn customer_node(id: i64, first_name: &str, last_name: &str) -> Value {
    json!({
        "id": format!("gid://shopify/Customer/{id}"),
        "firstName": first_name,
        "lastName": last_name,
        "displayName": format!("{first_name} {last_name}"),
        "email": format!("{}@example.com", first_name.to_lowercase()),
    })
}

/// A product node with one variant and an optional image.
#[must_use]
pub fn product_node(
    id: i64,
    title: &str,
    handle: &str,
    price: &str,
    status: &str,
    available_for_sale: bool,
    image_url: Option<&str>,
) -> Value {
    let images: Vec<Value> = image_url
        .map(|url| json!({"node": {"url": url}}))
        .into_iter()
        .collect();
    json!({
        "id": format!("gid://shopify/Product/{id}"),
        "title": title,
        "handle": handle,
        "status": status,
        "variants": {"edges": [{"node": {"price": price, "availableForSale": available_for_sale}}]},
        "images": {"edges": images},
    })
}

/// A personalization metafield.
#[must_use]
pub fn metafield(key: &str, value: &str) -> Value {
    json!({"namespace": "personalization", "key": key, "value": value})
}

/// Retry policy with tiny delays, so retry tests stay fast.
///
/// # Panics
///
/// Never; base delay is below the ceiling.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, 1, 5).unwrap()
}

/// Response captured from the router.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Send `GET uri` through `app` and decode the JSON body.
///
/// # Panics
///
/// Panics if the request cannot be built or the body cannot be read.
#[allow(clippy::unwrap_used)]
pub async fn get(app: Router, uri: &str) -> TestResponse {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    TestResponse {
        status,
        headers,
        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
    }
}
