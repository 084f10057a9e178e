//! HTTP client initialization.

use std::time::Duration;

use crate::config::Config;
use crate::error_handling::InitializationError;
use reqwest::ClientBuilder;

/// Initializes the HTTP client shared by both geolocation providers.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the TLS backend or
/// client configuration cannot be built.
pub fn init_client(config: &Config) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .connect_timeout(Duration::from_secs(config.timeout_seconds.min(5)))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}
