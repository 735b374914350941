//! Admin API client with retry, error classification and envelope checks.

use std::future::Future;
use std::sync::Arc;

use graphql_client::{QueryBody, Response};
use reqwest::Method;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::config::ApiConfig;

use super::{ApiError, GraphQLError, RetryPolicy};

/// Header carrying the Admin API access token.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Longest response body excerpt kept in logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// Session
// =============================================================================

/// Shop domain plus bearer credential for one request or batch.
///
/// `shop` is either a bare domain (`demo.myshopify.com`, HTTPS implied) or a
/// full origin (`http://127.0.0.1:8080`).
#[derive(Clone)]
pub struct Session {
    shop: String,
    access_token: SecretString,
}

impl Session {
    #[must_use]
    pub fn new(shop: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            shop: shop.into(),
            access_token: SecretString::from(access_token.into()),
        }
    }

    #[must_use]
    pub fn shop(&self) -> &str {
        &self.shop
    }

    #[must_use]
    pub const fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    /// Scheme and authority requests are sent to.
    fn origin(&self) -> String {
        let shop = self.shop.trim().trim_end_matches('/');
        if shop.starts_with("http://") || shop.starts_with("https://") {
            shop.to_string()
        } else {
            format!("https://{shop}")
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Attempt results
// =============================================================================

/// Why a single attempt failed.
///
/// `status` drives retry classification: `400..500` is terminal, anything
/// else (including no status at all) is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFailure {
    pub message: String,
    pub status: Option<u16>,
    pub body: Option<String>,
}

impl CallFailure {
    /// A failure with no HTTP status (connection refused, timeout, ...).
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            body: None,
        }
    }

    /// A failure carrying the upstream status and raw body.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>, body: Option<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
            body,
        }
    }

    /// The status, when it is a 4xx.
    #[must_use]
    pub fn client_error_status(&self) -> Option<u16> {
        self.status.filter(|s| (400..500).contains(s))
    }
}

impl From<reqwest::Error> for CallFailure {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
            body: None,
        }
    }
}

/// A successful HTTP response, body not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub body: String,
}

impl RawResponse {
    /// Decode the body, rejecting empty and `null` bodies.
    ///
    /// # Errors
    ///
    /// `EmptyResponse` when there is nothing to decode, `Json` when the body
    /// is not JSON.
    pub fn into_json(self, operation: &str) -> Result<serde_json::Value, ApiError> {
        if self.body.trim().is_empty() {
            return Err(ApiError::EmptyResponse(operation.to_string()));
        }

        let value: serde_json::Value =
            serde_json::from_str(&self.body).map_err(|source| {
                warn!(
                    operation,
                    body = %excerpt(&self.body),
                    "Upstream returned a non-JSON body"
                );
                ApiError::Json {
                    operation: operation.to_string(),
                    source,
                }
            })?;

        if value.is_null() {
            return Err(ApiError::EmptyResponse(operation.to_string()));
        }
        Ok(value)
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Shopify Admin API client.
///
/// Cheap to clone; every clone shares one connection pool, one configuration
/// and one retry policy. Build it once at startup and hand it to the services.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    config: ApiConfig,
    retry: RetryPolicy,
}

impl ApiClient {
    /// Create a new Admin API client.
    ///
    /// Every attempt is bounded by [`ApiConfig::request_timeout`]; a timeout
    /// is a transport failure and goes through the retry policy.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(config: ApiConfig, retry: RetryPolicy) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            inner: Arc::new(ApiClientInner {
                client,
                config,
                retry,
            }),
        }
    }

    /// Build a session. No network traffic.
    #[must_use]
    pub fn create_session(shop: impl Into<String>, access_token: impl Into<String>) -> Session {
        Session::new(shop, access_token)
    }

    /// Build a session from the configured shop and access token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` if either is not configured.
    pub fn session_from_config(&self) -> Result<Session, ApiError> {
        let config = &self.inner.config;
        let shop = config
            .shop()
            .ok_or_else(|| ApiError::Configuration("shop is not configured".to_string()))?;
        let token = config.access_token().ok_or_else(|| {
            ApiError::Configuration("access token is not configured".to_string())
        })?;
        Ok(Session::new(shop, token.expose_secret()))
    }

    // =========================================================================
    // Retry loop
    // =========================================================================

    /// Run `thunk` under the retry policy.
    ///
    /// The thunk may run up to `max_retries + 1` times, so it must be safe to
    /// repeat. A failure with a 4xx status ends the call immediately with
    /// `ApiError::Client`; any other failure is retried after
    /// `min(base * 2^attempt, max)` milliseconds until the budget runs out, then
    /// surfaces as `ApiError::UpstreamCall`.
    ///
    /// The thunk's value is returned as is. Envelope checks (empty body,
    /// `errors` field) are done by [`Self::graphql_call`] and
    /// [`Self::rest_call`] once the loop has produced a response, so callers
    /// using `call` directly get no body validation and those failures are
    /// never retried.
    ///
    /// # Errors
    ///
    /// See above.
    #[instrument(skip_all, fields(operation = %operation))]
    pub async fn call<T, F, Fut>(&self, operation: &str, mut thunk: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallFailure>>,
    {
        let policy = self.inner.retry;
        let mut attempt: u32 = 0;

        loop {
            let failure = match thunk().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempt, "Upstream call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(failure) => failure,
            };

            if let Some(status) = failure.client_error_status() {
                warn!(status, error = %failure.message, "Upstream rejected request");
                return Err(ApiError::Client {
                    operation: operation.to_string(),
                    message: failure.message,
                    status,
                    body: failure.body,
                });
            }

            if attempt >= policy.max_retries() {
                error!(
                    attempts = attempt + 1,
                    status = ?failure.status,
                    error = %failure.message,
                    "Upstream call failed, retry budget exhausted"
                );
                return Err(ApiError::UpstreamCall {
                    operation: operation.to_string(),
                    message: failure.message,
                    status: failure.status,
                    body: failure.body,
                    attempts: attempt + 1,
                });
            }

            let delay_ms = policy.delay_ms_for_attempt(attempt);
            warn!(
                attempt,
                delay_ms,
                status = ?failure.status,
                error = %failure.message,
                "Upstream call failed, retrying"
            );
            tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
            attempt += 1;
        }
    }

    // =========================================================================
    // Transports
    // =========================================================================

    /// Execute a GraphQL document and decode its `data` into `T`.
    ///
    /// # Errors
    ///
    /// Anything [`Self::call`] returns, plus `EmptyResponse` for a missing body
    /// or `data`, `UpstreamQuery` when the response lists errors, and `Json`
    /// when `data` does not match `T`.
    #[instrument(skip(self, session, query, variables), fields(shop = %session.shop()))]
    pub async fn graphql_call<T: DeserializeOwned>(
        &self,
        session: &Session,
        query: &'static str,
        variables: serde_json::Value,
        operation: &'static str,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(session, "graphql.json")?;
        let request = QueryBody {
            variables,
            query,
            operation_name: operation,
        };
        let body = serde_json::to_value(&request).map_err(|source| ApiError::Json {
            operation: operation.to_string(),
            source,
        })?;

        let method = Method::POST;
        let raw = self
            .call(operation, || self.send(session, &method, &url, Some(&body)))
            .await?;

        let response: Response<serde_json::Value> =
            serde_json::from_value(raw.into_json(operation)?).map_err(|source| {
                ApiError::Json {
                    operation: operation.to_string(),
                    source,
                }
            })?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ApiError::UpstreamQuery(
                errors.into_iter().map(GraphQLError::from).collect(),
            ));
        }

        let data = response
            .data
            .filter(|d| !d.is_null())
            .ok_or_else(|| ApiError::EmptyResponse(operation.to_string()))?;

        serde_json::from_value(data).map_err(|source| ApiError::Json {
            operation: operation.to_string(),
            source,
        })
    }

    /// Execute a REST call and decode the body into `T`.
    ///
    /// `path` is relative to the versioned Admin API root and may carry a
    /// query string (`customers/1/metafields?namespace=personalization`); the
    /// `.json` suffix is added when missing.
    ///
    /// # Errors
    ///
    /// Anything [`Self::call`] returns, plus `EmptyResponse` for a missing
    /// body, `UpstreamResponse` when the body carries `errors`, and `Json`
    /// when the body does not match `T`.
    #[instrument(skip(self, session, body), fields(shop = %session.shop()))]
    pub async fn rest_call<T: DeserializeOwned>(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        operation: &str,
    ) -> Result<T, ApiError> {
        let url = self.rest_url(session, path)?;

        let raw = self
            .call(operation, || self.send(session, &method, &url, body))
            .await?;

        let value = raw.into_json(operation)?;
        if let Some(errors) = value.get("errors") {
            return Err(ApiError::UpstreamResponse {
                operation: operation.to_string(),
                message: describe_errors(errors),
            });
        }

        serde_json::from_value(value).map_err(|source| ApiError::Json {
            operation: operation.to_string(),
            source,
        })
    }

    /// Send one request. Non-2xx statuses become a [`CallFailure`] carrying
    /// the status and raw body.
    async fn send(
        &self,
        session: &Session,
        method: &Method,
        url: &Url,
        body: Option<&serde_json::Value>,
    ) -> Result<RawResponse, CallFailure> {
        let mut request = self
            .inner
            .client
            .request(method.clone(), url.clone())
            .header(ACCESS_TOKEN_HEADER, session.access_token().expose_secret())
            .header(ACCEPT, "application/json");

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!(
                status = %status,
                body = %excerpt(&text),
                "Shopify API returned non-success status"
            );
            let body = (!text.is_empty()).then_some(text);
            return Err(CallFailure::http(
                status.as_u16(),
                format!("HTTP {status}"),
                body,
            ));
        }

        Ok(RawResponse { body: text })
    }

    // =========================================================================
    // URLs
    // =========================================================================

    fn endpoint(&self, session: &Session, resource: &str) -> Result<Url, ApiError> {
        let raw = format!(
            "{}/admin/api/{}/{}",
            session.origin(),
            self.inner.config.api_version(),
            resource
        );
        Url::parse(&raw).map_err(|e| {
            ApiError::Configuration(format!("invalid shop '{}': {e}", session.shop()))
        })
    }

    fn rest_url(&self, session: &Session, path: &str) -> Result<Url, ApiError> {
        let (path, query) = path
            .split_once('?')
            .map_or((path, None), |(p, q)| (p, Some(q)));
        let path = path.trim_matches('/');
        let resource = if path.ends_with(".json") {
            path.to_string()
        } else {
            format!("{path}.json")
        };

        let mut url = self.endpoint(session, &resource)?;
        url.set_query(query);
        Ok(url)
    }
}

/// Render a REST `errors` value as one message.
///
/// Arrays are joined with `", "`, strings are used verbatim, objects become
/// `field: message` pairs.
fn describe_errors(errors: &serde_json::Value) -> String {
    match errors {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(describe_errors)
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Object(fields) => fields
            .iter()
            .map(|(field, value)| format!("{field}: {}", describe_errors(value)))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(LOG_BODY_LIMIT).collect()
}
