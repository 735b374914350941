//! Proxy configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_API_KEY` - App API key
//! - `SHOPIFY_API_SECRET` - App API secret
//! - `SHOPIFY_SCOPES` - Comma-separated access scopes (e.g. `read_customers,read_products`)
//! - `SHOPIFY_APP_HOST` - Public host name of the app
//!
//! ## Optional
//! - `SHOPIFY_API_VERSION` - API version (default: 2026-01)
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token used for proxy sessions
//! - `SHOPIFY_SHOP` - Shop domain used for proxy sessions (e.g. your-store.myshopify.com)
//! - `SHOPIFY_REQUEST_TIMEOUT_MS` - Per-attempt request timeout (default: 30000)
//! - `SHOPIFY_MAX_RETRIES` - Retries after the first attempt (default: 3)
//! - `SHOPIFY_RETRY_BASE_DELAY_MS` - First backoff delay (default: 500)
//! - `SHOPIFY_RETRY_MAX_DELAY_MS` - Backoff ceiling (default: 8000)
//! - `PROXY_HOST` - Bind address (default: 127.0.0.1)
//! - `PROXY_PORT` - Listen port (default: 3000)
//! - `PROXY_EXPOSE_ERRORS` - Pass internal error messages to clients (default: false)
//! - `PROXY_DEFAULT_FIRST_NAME` - Name used when a customer has none (default: Valued Customer)
//! - `PROXY_DEFAULT_AVATAR_URL` - Avatar used when a customer has none
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::shopify::RetryPolicy;

/// Default Admin API version.
pub const DEFAULT_API_VERSION: &str = "2026-01";

/// Default per-attempt timeout for upstream requests.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default first name shown when the customer record has none.
pub const DEFAULT_FIRST_NAME: &str = "Valued Customer";

/// Default avatar shown when the customer record has no profile image.
pub const DEFAULT_AVATAR_URL: &str = "/assets/default-avatar.png";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Missing required API configuration field: {0}")]
    MissingField(&'static str),
    #[error("Invalid retry policy: base delay {base_delay_ms}ms exceeds max delay {max_delay_ms}ms")]
    InvalidRetryPolicy { base_delay_ms: u64, max_delay_ms: u64 },
}

/// Proxy application configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Upstream Admin API configuration
    pub shopify: ApiConfig,
    /// Retry policy applied to every upstream call
    pub retry: RetryPolicy,
    /// Whether internal error messages reach clients (development deployments)
    pub expose_errors: bool,
    /// Substitutes for empty customer fields
    pub defaults: PersonalizationDefaults,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Values substituted into the personalization result when the customer
/// record leaves them empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalizationDefaults {
    pub first_name: String,
    pub avatar_url: String,
}

impl Default for PersonalizationDefaults {
    fn default() -> Self {
        Self {
            first_name: DEFAULT_FIRST_NAME.to_string(),
            avatar_url: DEFAULT_AVATAR_URL.to_string(),
        }
    }
}

/// Upstream Admin API configuration.
///
/// Immutable once built. Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ApiConfig {
    api_key: String,
    api_secret: SecretString,
    scopes: Vec<String>,
    host: String,
    api_version: String,
    access_token: Option<SecretString>,
    shop: Option<String>,
    request_timeout: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("host", &self.host)
            .field("api_version", &self.api_version)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("shop", &self.shop)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ApiConfig {
    /// Build an API configuration from its required fields.
    ///
    /// `api_version` starts at [`DEFAULT_API_VERSION`], the request timeout at
    /// [`DEFAULT_REQUEST_TIMEOUT_MS`]; access token and shop start absent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` if any required field is empty.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        scopes: Vec<String>,
        host: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        let api_secret = api_secret.into();
        let host = host.into();
        let scopes: Vec<String> = scopes
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingField("api_key"));
        }
        if api_secret.trim().is_empty() {
            return Err(ConfigError::MissingField("api_secret"));
        }
        if scopes.is_empty() {
            return Err(ConfigError::MissingField("scopes"));
        }
        if host.trim().is_empty() {
            return Err(ConfigError::MissingField("host"));
        }

        Ok(Self {
            api_key,
            api_secret: SecretString::from(api_secret),
            scopes,
            host,
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: None,
            shop: None,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        })
    }

    /// Override the API version. Blank values keep the default.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        let api_version = api_version.into();
        if !api_version.trim().is_empty() {
            self.api_version = api_version;
        }
        self
    }

    /// Set the default access token used by [`crate::shopify::ApiClient::session_from_config`].
    #[must_use]
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        let access_token = access_token.into();
        self.access_token =
            (!access_token.trim().is_empty()).then(|| SecretString::from(access_token));
        self
    }

    /// Set the default shop domain used by [`crate::shopify::ApiClient::session_from_config`].
    #[must_use]
    pub fn with_shop(mut self, shop: impl Into<String>) -> Self {
        let shop = shop.into();
        self.shop = (!shop.trim().is_empty()).then_some(shop);
        self
    }

    /// Bound each upstream attempt. A timed-out attempt counts as a
    /// retryable transport failure.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The app secret (for webhook/HMAC verification by callers).
    #[must_use]
    pub const fn api_secret(&self) -> &SecretString {
        &self.api_secret
    }

    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    #[must_use]
    pub const fn access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }

    #[must_use]
    pub fn shop(&self) -> Option<&str> {
        self.shop.as_deref()
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(
            get_required_env("SHOPIFY_API_KEY")?,
            get_required_env("SHOPIFY_API_SECRET")?,
            parse_scopes(&get_required_env("SHOPIFY_SCOPES")?),
            get_required_env("SHOPIFY_APP_HOST")?,
        )?
        .with_api_version(get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION))
        .with_request_timeout(Duration::from_millis(parse_env(
            "SHOPIFY_REQUEST_TIMEOUT_MS",
            &DEFAULT_REQUEST_TIMEOUT_MS.to_string(),
        )?));

        if let Some(token) = get_optional_env("SHOPIFY_ACCESS_TOKEN") {
            config = config.with_access_token(token);
        }
        if let Some(shop) = get_optional_env("SHOPIFY_SHOP") {
            config = config.with_shop(shop);
        }

        Ok(config)
    }
}

impl ProxyConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("PROXY_HOST", "127.0.0.1")?;
        let port = parse_env("PROXY_PORT", "3000")?;
        let expose_errors = parse_env("PROXY_EXPOSE_ERRORS", "false")?;

        let shopify = ApiConfig::from_env()?;
        let retry = retry_policy_from_env()?;

        let defaults = PersonalizationDefaults {
            first_name: get_env_or_default("PROXY_DEFAULT_FIRST_NAME", DEFAULT_FIRST_NAME),
            avatar_url: get_env_or_default("PROXY_DEFAULT_AVATAR_URL", DEFAULT_AVATAR_URL),
        };

        Ok(Self {
            host,
            port,
            shopify,
            retry,
            expose_errors,
            defaults,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Load the retry policy on its own (also used by the CLI).
///
/// # Errors
///
/// Returns `ConfigError` if a value is not a number or the delays are inverted.
pub fn retry_policy_from_env() -> Result<RetryPolicy, ConfigError> {
    let defaults = RetryPolicy::default();
    RetryPolicy::new(
        parse_env(
            "SHOPIFY_MAX_RETRIES",
            &defaults.max_retries().to_string(),
        )?,
        parse_env(
            "SHOPIFY_RETRY_BASE_DELAY_MS",
            &defaults.base_delay_ms().to_string(),
        )?,
        parse_env(
            "SHOPIFY_RETRY_MAX_DELAY_MS",
            &defaults.max_delay_ms().to_string(),
        )?,
    )
}

/// Load only the upstream API configuration (used by the CLI).
///
/// # Errors
///
/// Returns `ConfigError` if required variables are missing.
pub fn api_config_from_env() -> Result<ApiConfig, ConfigError> {
    let _ = dotenvy::dotenv();
    ApiConfig::from_env()
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Split a comma-separated scope list, dropping blanks.
fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
