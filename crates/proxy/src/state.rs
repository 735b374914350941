//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ProxyConfig;
use crate::personalize::Personalizer;
use crate::shopify::{ApiClient, ApiError, Session};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds read-only configuration and the one
/// Admin API client every request shares.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ProxyConfig,
    client: ApiClient,
    personalizer: Personalizer,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ProxyConfig) -> Self {
        let client = ApiClient::new(config.shopify.clone(), config.retry);
        let personalizer = Personalizer::new(client.clone(), config.defaults.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                client,
                personalizer,
            }),
        }
    }

    /// Get a reference to the proxy configuration.
    #[must_use]
    pub fn config(&self) -> &ProxyConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn personalizer(&self) -> &Personalizer {
        &self.inner.personalizer
    }

    /// Session for the configured shop.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` if the shop or access token is not
    /// configured.
    pub fn session(&self) -> Result<Session, ApiError> {
        self.inner.client.session_from_config()
    }
}
