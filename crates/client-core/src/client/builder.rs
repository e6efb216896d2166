//! Builder for creating voice session managers

use std::sync::Arc;

use crate::client::config::ClientConfig;
use crate::client::manager::VoiceSessionManager;
use crate::error::{ClientError, ClientResult};
use crate::transport::{AlwaysGranted, AudioTransport, RecordPermission};

/// Builder for a [`VoiceSessionManager`]
///
/// A transport implementation is required; the permission source defaults to
/// [`AlwaysGranted`] for platforms that gate microphone access elsewhere.
pub struct VoiceSessionBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn AudioTransport>>,
    permission: Arc<dyn RecordPermission>,
}

impl VoiceSessionBuilder {
    /// Create a new builder for the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(api_key),
            transport: None,
            permission: Arc::new(AlwaysGranted),
        }
    }

    /// Override the conversation service base URL
    pub fn service_url(mut self, service_url: impl Into<String>) -> Self {
        self.config.service_url = service_url.into();
        self
    }

    /// Set the audio transport the manager drives
    pub fn transport(mut self, transport: Arc<dyn AudioTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the microphone permission source
    pub fn record_permission(mut self, permission: Arc<dyn RecordPermission>) -> Self {
        self.permission = permission;
        self
    }

    /// Build the session manager
    pub async fn build(self) -> ClientResult<Arc<VoiceSessionManager>> {
        let transport = self.transport.ok_or(ClientError::MissingConfiguration {
            field: "transport".to_string(),
        })?;
        Ok(VoiceSessionManager::new(self.config, transport, self.permission).await)
    }
}
