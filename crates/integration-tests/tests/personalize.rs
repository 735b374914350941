//! End-to-end tests for `GET /proxy/personalize`.

use axum::http::StatusCode;
use serde_json::json;

use shop_persona_integration_tests::{
    MockStore, customer_node, fast_retry, get, metafield, product_node,
};
use shop_persona_proxy::shopify::RetryPolicy;

// ============================================================================
// Resolution chain
// ============================================================================

#[tokio::test]
async fn test_assigned_product_is_returned() {
    let store = MockStore::start();
    let customer = store.mock_customer(123, customer_node(123, "John", "Doe"));
    let metafields = store.mock_metafields(
        123,
        json!([
            metafield("profile_image_url", "https://cdn.example.com/john.png"),
            metafield("assigned_product_id", "456"),
        ]),
    );
    let product = store.mock_product(
        456,
        product_node(
            456,
            "Premium Widget",
            "premium-widget",
            "19.99",
            "ACTIVE",
            true,
            Some("https://cdn.example.com/widget.png"),
        ),
    );
    let default_products = store.mock_default_products(&[]);

    let response = get(
        store.app(RetryPolicy::no_retry()),
        "/proxy/personalize?user_id=123",
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({
            "success": true,
            "data": {
                "user_id": "123",
                "first_name": "John",
                "profile_image_url": "https://cdn.example.com/john.png",
                "assigned_product": {
                    "id": 456,
                    "title": "Premium Widget",
                    "handle": "premium-widget",
                    "price": "19.99",
                    "image_url": "https://cdn.example.com/widget.png",
                    "available": true
                }
            }
        })
    );
    customer.assert_hits(1);
    metafields.assert_hits(1);
    product.assert_hits(1);
    default_products.assert_hits(0);
}

#[tokio::test]
async fn test_store_default_product_when_none_assigned() {
    let store = MockStore::start();
    let _customer = store.mock_customer(77, customer_node(77, "Ann", "Lee"));
    let _metafields = store.mock_metafields(77, json!([]));
    let default_products = store.mock_default_products(&[product_node(
        900,
        "Travel Mug",
        "travel-mug",
        "14.50",
        "ACTIVE",
        true,
        None,
    )]);

    let response = get(
        store.app(RetryPolicy::no_retry()),
        "/proxy/personalize?user_id=77",
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["profile_image_url"], "/assets/default-avatar.png");
    assert_eq!(data["assigned_product"]["handle"], "travel-mug");
    assert_eq!(data["assigned_product"]["image_url"], "");
    default_products.assert_hits(1);
}

#[tokio::test]
async fn test_fallback_sentinel_when_store_has_no_active_products() {
    let store = MockStore::start();
    let _customer = store.mock_customer(5, customer_node(5, "", "Nobody"));
    let _metafields = store.mock_metafields(5, json!([]));
    let _default_products = store.mock_default_products(&[]);

    let response = get(
        store.app(RetryPolicy::no_retry()),
        "/proxy/personalize?user_id=5",
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"],
        json!({
            "user_id": "5",
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

#[tokio::test]
async fn test_fallback_sentinel_when_default_product_lookup_fails() {
    let store = MockStore::start();
    let _customer = store.mock_customer(5, customer_node(5, "Sam", "Hill"));
    let _metafields = store.mock_metafields(5, json!([]));
    let default_products = store.mock_default_products_status(503);

    let response = get(store.app(fast_retry(2)), "/proxy/personalize?user_id=5").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["assigned_product"]["id"], 0);
    default_products.assert_hits(3);
}

#[tokio::test]
async fn test_metafield_failure_still_returns_customer() {
    let store = MockStore::start();
    let _customer = store.mock_customer(123, customer_node(123, "John", "Doe"));
    let metafields = store.mock_metafields_status(123, 500);
    let _default_products = store.mock_default_products(&[]);

    let response = get(store.app(fast_retry(1)), "/proxy/personalize?user_id=123").await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["first_name"], "John");
    assert_eq!(data["profile_image_url"], "/assets/default-avatar.png");
    assert_eq!(data["assigned_product"]["handle"], "featured-product");
    metafields.assert_hits(2);
}

#[tokio::test]
async fn test_accepts_customer_global_id() {
    let store = MockStore::start();
    let customer = store.mock_customer(123, customer_node(123, "John", "Doe"));
    let _metafields = store.mock_metafields(123, json!([]));
    let _default_products = store.mock_default_products(&[]);

    let response = get(
        store.app(RetryPolicy::no_retry()),
        "/proxy/personalize?user_id=gid://shopify/Customer/123",
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["user_id"], "gid://shopify/Customer/123");
    customer.assert_hits(1);
}

// ============================================================================
// Client errors
// ============================================================================

#[tokio::test]
async fn test_missing_user_id() {
    let store = MockStore::start();

    let response = get(store.app(RetryPolicy::no_retry()), "/proxy/personalize").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({"success": false, "error": "Invalid or missing user_id parameter"})
    );
}

#[tokio::test]
async fn test_malformed_user_id_never_reaches_upstream() {
    let store = MockStore::start();
    let customer = store.mock_customer_status(0, 200);

    for uri in [
        "/proxy/personalize?user_id=",
        "/proxy/personalize?user_id=abc",
        "/proxy/personalize?user_id=-3",
        "/proxy/personalize?user_id=gid://shopify/Product/9",
    ] {
        let response = get(store.app(RetryPolicy::no_retry()), uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
    }
    customer.assert_hits(0);
}

#[tokio::test]
async fn test_unknown_customer() {
    let store = MockStore::start();
    let _customer = store.mock_customer(404_404, serde_json::Value::Null);

    let response = get(
        store.app(RetryPolicy::no_retry()),
        "/proxy/personalize?user_id=404404",
    )
    .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.body,
        json!({"success": false, "error": "Customer not found"})
    );
}

// ============================================================================
// Upstream failures
// ============================================================================

#[tokio::test]
async fn test_persistent_upstream_failure_is_retried_then_500() {
    let store = MockStore::start();
    let customer = store.mock_customer_status(123, 503);

    let response = get(store.app(fast_retry(3)), "/proxy/personalize?user_id=123").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.body,
        json!({"success": false, "error": "Internal server error"})
    );
    customer.assert_hits(4);
}

#[tokio::test]
async fn test_upstream_client_error_is_not_retried() {
    let store = MockStore::start();
    let customer = store.mock_customer_status(123, 404);

    let response = get(store.app(fast_retry(3)), "/proxy/personalize?user_id=123").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    customer.assert_hits(1);
}

#[tokio::test]
async fn test_exposed_errors_carry_upstream_message() {
    let store = MockStore::start();
    let _customer = store.mock_customer_status(123, 502);

    let response = get(
        store.app_exposing_errors(RetryPolicy::no_retry()),
        "/proxy/personalize?user_id=123",
    )
    .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.body["error"].as_str().unwrap_or_default();
    assert!(error.contains("GetCustomer"), "{error}");
    assert!(error.contains("502"), "{error}");
}

// ============================================================================
// Ambient
// ============================================================================

#[tokio::test]
async fn test_every_response_has_request_id() {
    let store = MockStore::start();

    let ok = get(store.app(RetryPolicy::no_retry()), "/health").await;
    let bad = get(store.app(RetryPolicy::no_retry()), "/proxy/personalize").await;

    assert_eq!(ok.status, StatusCode::OK);
    assert!(ok.headers.contains_key("x-request-id"));
    assert!(bad.headers.contains_key("x-request-id"));
}
