//! CLI subcommands.

pub mod personalize;
pub mod seed;

use shop_persona_proxy::config::{api_config_from_env, retry_policy_from_env};
use shop_persona_proxy::shopify::{ApiClient, Session};

/// Store selected on the command line; unset fields come from the environment.
pub struct Target {
    pub shop: Option<String>,
    pub access_token: Option<String>,
}

/// Build a client and session for `target`.
///
/// # Errors
///
/// Returns an error if required environment variables are missing or no shop
/// or access token is available.
pub fn connect(target: &Target) -> Result<(ApiClient, Session), Box<dyn std::error::Error>> {
    let mut config = api_config_from_env()?;
    if let Some(shop) = &target.shop {
        config = config.with_shop(shop.clone());
    }
    if let Some(token) = &target.access_token {
        config = config.with_access_token(token.clone());
    }

    let client = ApiClient::new(config, retry_policy_from_env()?);
    let session = client.session_from_config()?;
    Ok((client, session))
}
