//! Client configuration for the voice session manager

use serde::{Deserialize, Serialize};

/// Default conversation service host
pub const DEFAULT_SERVICE_URL: &str = "https://converse-api.guidecall.io";

/// Configuration for the voice session client
///
/// Only the API key is required; the service URL defaults to the production
/// host. The transport application identifier is not configured here; it
/// arrives dynamically in the negotiated credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API key sent with every conversation service request
    pub api_key: String,
    /// Base URL of the conversation service
    pub service_url: String,
}

impl ClientConfig {
    /// Create a configuration for the default service host
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            service_url: DEFAULT_SERVICE_URL.to_string(),
        }
    }

    /// Override the conversation service base URL
    pub fn with_service_url(mut self, service_url: impl Into<String>) -> Self {
        self.service_url = service_url.into();
        self
    }
}
