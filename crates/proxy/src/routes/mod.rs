//! HTTP route handlers for the proxy.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /proxy/personalize      - Personalization for ?user_id=
//! ```

pub mod personalize;

use axum::{Router, middleware, routing::get};
use serde::Serialize;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// JSON envelope for every API response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    #[must_use]
    pub const fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/proxy/personalize", get(personalize::personalize))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the upstream API.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::config::{ApiConfig, PersonalizationDefaults, ProxyConfig};
    use crate::shopify::RetryPolicy;

    fn state(shop: Option<&str>) -> AppState {
        let mut shopify = ApiConfig::new(
            "key",
            "secret",
            vec!["read_customers".to_string()],
            "app.example.com",
        )
        .unwrap();
        if let Some(shop) = shop {
            shopify = shopify.with_shop(shop).with_access_token("shpat_test");
        }

        AppState::new(ProxyConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            shopify,
            retry: RetryPolicy::no_retry(),
            expose_errors: false,
            defaults: PersonalizationDefaults::default(),
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or_default())
    }

    #[tokio::test]
    async fn test_health() {
        let response = router(state(None))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_missing_user_id_is_bad_request() {
        let (status, body) = get(router(state(None)), "/proxy/personalize").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid or missing user_id parameter");
    }

    #[tokio::test]
    async fn test_non_numeric_user_id_is_bad_request() {
        let (status, _) = get(router(state(None)), "/proxy/personalize?user_id=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_configured_state_builds_session() {
        let session = state(Some("demo.myshopify.com")).session().unwrap();
        assert_eq!(session.shop(), "demo.myshopify.com");
        assert!(state(None).session().is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_session_is_internal_error() {
        let (status, body) = get(router(state(None)), "/proxy/personalize?user_id=1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
