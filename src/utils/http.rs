//! HTTP client utilities.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::sources::SourceError;

/// Default user agent: `publist-enrich/<version>`
pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::with_options(DEFAULT_USER_AGENT, Duration::from_secs(30))
    }

    /// Create a new HTTP client with a custom user agent and request timeout
    pub fn with_options(user_agent: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Create from an existing reqwest Client
    pub fn from_client(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
