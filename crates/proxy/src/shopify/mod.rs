//! Shopify Admin API access layer.
//!
//! # Architecture
//!
//! - [`ApiClient`] owns the HTTP transport, the retry policy, and response
//!   normalization for both the REST and GraphQL endpoints
//! - GraphQL requests and responses use the `graphql_client` envelope
//!   (`QueryBody`, `Response`); `data` is then decoded into the explicit DTOs
//!   in [`types`] before any service sees them
//! - Shopify is source of truth - no local sync, no response cache
//!
//! # Retry semantics
//!
//! Every call runs under a [`RetryPolicy`]. 4xx responses are terminal on the
//! first attempt; transport failures and 5xx responses are retried with
//! exponential backoff up to `max_retries` times.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_persona_proxy::shopify::{ApiClient, RetryPolicy};
//!
//! let client = ApiClient::new(config.shopify.clone(), RetryPolicy::default());
//! let session = ApiClient::create_session("demo.myshopify.com", "shpat_...");
//!
//! let data: serde_json::Value = client
//!     .graphql_call(&session, "{ shop { name } }", serde_json::json!({}), "ShopName")
//!     .await?;
//! ```

mod client;
pub mod conversions;
pub mod queries;
mod retry;
pub mod types;

pub use client::{ACCESS_TOKEN_HEADER, ApiClient, CallFailure, RawResponse, Session};
pub use retry::RetryPolicy;

use shop_persona_core::{MalformedIdError, PriceError};
use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client or session is missing required configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Upstream rejected the request with a 4xx status. Never retried.
    #[error("{operation} rejected with status {status}: {message}")]
    Client {
        operation: String,
        message: String,
        status: u16,
        body: Option<String>,
    },

    /// Retry budget exhausted on transport failures or 5xx responses.
    #[error("{operation} failed after {attempts} attempt(s): {message}")]
    UpstreamCall {
        operation: String,
        message: String,
        status: Option<u16>,
        body: Option<String>,
        attempts: u32,
    },

    /// Successful transport, but no body.
    #[error("{0} returned an empty response")]
    EmptyResponse(String),

    /// Successful transport, but the body carries an `errors` field.
    #[error("{operation} returned errors: {message}")]
    UpstreamResponse { operation: String, message: String },

    /// GraphQL response carried a non-empty error list.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    UpstreamQuery(Vec<GraphQLError>),

    /// Body could not be encoded or decoded.
    #[error("Invalid JSON for {operation}: {source}")]
    Json {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    /// A global id in the response could not be parsed.
    #[error(transparent)]
    MalformedId(#[from] MalformedIdError),

    /// A price in the response could not be parsed.
    #[error(transparent)]
    InvalidPrice(#[from] PriceError),

    /// A create call succeeded but the response lacked the new id.
    #[error("Creation failed: {0}")]
    CreationFailed(String),
}

impl ApiError {
    /// HTTP status attached to the failure, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. } => Some(*status),
            Self::UpstreamCall { status, .. } => *status,
            _ => None,
        }
    }

    /// Raw upstream response body attached to the failure, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Client { body, .. } | Self::UpstreamCall { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// Whether upstream refused a create because a unique field is taken.
    ///
    /// Shopify answers duplicate emails/handles with a 422 whose body reads
    /// `{"errors": {"email": ["has already been taken"]}}`.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        let mentions_taken = |text: &str| {
            let text = text.to_lowercase();
            text.contains("already been taken") || text.contains("already exists")
        };

        match self {
            Self::Client { status: 422, body, message, .. } => {
                body.as_deref().is_some_and(mentions_taken) || mentions_taken(message)
            }
            Self::UpstreamResponse { message, .. } => mentions_taken(message),
            _ => false,
        }
    }
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

impl From<graphql_client::Error> for GraphQLError {
    fn from(err: graphql_client::Error) -> Self {
        Self {
            message: err.message,
            locations: err.locations.map_or_else(Vec::new, |locs| {
                locs.into_iter()
                    .map(|l| GraphQLErrorLocation {
                        line: i64::from(l.line),
                        column: i64::from(l.column),
                    })
                    .collect()
            }),
            path: err.path.map_or_else(Vec::new, |p| {
                p.into_iter()
                    .map(|fragment| match fragment {
                        graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                        graphql_client::PathFragment::Index(i) => {
                            serde_json::Value::Number(i.into())
                        }
                    })
                    .collect()
            }),
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
