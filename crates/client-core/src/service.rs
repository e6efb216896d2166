//! Conversation negotiation client
//!
//! This module performs the REST half of a voice session: fetching the
//! credential bundle that authorizes a transport channel join, activating the
//! conversation on the backend, and tearing it down again. All transport
//! (real-time audio) operations live behind the [`crate::transport`] seam;
//! this client only ever speaks JSON over HTTPS.
//!
//! # Operations
//!
//! | Operation | Endpoint | Failure mapping |
//! |---|---|---|
//! | [`fetch_tour_credentials`](ConversationService::fetch_tour_credentials) | `POST /conversation/tour/config` | non-200 → `NetworkError`, bad schema → `InvalidToken` |
//! | [`fetch_credentials`](ConversationService::fetch_credentials) | `POST /conversation/config` | same |
//! | [`activate_conversation`](ConversationService::activate_conversation) | `POST /conversation/start` | non-200 → `ConversationError` |
//! | [`end_conversation`](ConversationService::end_conversation) | `POST /conversation/end` | non-200 → `ConversationError` |
//!
//! Every request carries the API key header and a JSON body. A malformed
//! base URL fails with `InvalidUrl` before any network I/O; connection and
//! read failures map to `InvalidResponse`. The client never retries;
//! failures are surfaced to the session manager, which owns the
//! failure-handling policy.

use reqwest::StatusCode;
use url::Url;

use crate::client::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::{GeoPoint, SessionCredentials};

/// Request header carrying the service API key
pub const API_KEY_HEADER: &str = "Guidecall-API-Key";

/// Stateless REST client for the conversation endpoints
///
/// Explicitly constructed and owned by the session manager; holds nothing but
/// the connection pool. One call in flight per operation.
#[derive(Debug, Clone)]
pub struct ConversationService {
    http: reqwest::Client,
}

impl ConversationService {
    /// Create a new service client with its own connection pool
    pub fn new() -> Self {
        Self { http: reqwest::Client::new() }
    }

    /// Fetch conversation credentials for a tour session
    ///
    /// # Arguments
    ///
    /// * `user_id` - Caller-supplied user identifier (the backend assigns the
    ///   numeric transport uid in the response)
    /// * `tour_id` - Identifier of the tour being asked about
    /// * `location` - Device coordinates at negotiation time
    /// * `config` - Service endpoint and API key
    pub async fn fetch_tour_credentials(
        &self,
        user_id: &str,
        tour_id: u32,
        location: GeoPoint,
        config: &ClientConfig,
    ) -> ClientResult<SessionCredentials> {
        let url = self.endpoint(config, "/conversation/tour/config")?;
        let body = serde_json::json!({
            "userId": user_id,
            "tourId": tour_id,
            "latitude": location.latitude,
            "longitude": location.longitude,
        });

        tracing::debug!(user_id, tour_id, "fetching tour conversation credentials");
        let response = self.post_json(url, &config.api_key, &body).await?;
        Self::decode_credentials(response).await
    }

    /// Fetch conversation credentials without a tour context
    pub async fn fetch_credentials(
        &self,
        user_id: &str,
        location: GeoPoint,
        config: &ClientConfig,
    ) -> ClientResult<SessionCredentials> {
        let url = self.endpoint(config, "/conversation/config")?;
        let body = serde_json::json!({
            "userId": user_id,
            "latitude": location.latitude,
            "longitude": location.longitude,
        });

        tracing::debug!(user_id, "fetching conversation credentials");
        let response = self.post_json(url, &config.api_key, &body).await?;
        Self::decode_credentials(response).await
    }

    /// Activate a negotiated conversation on the backend
    ///
    /// Posts the full credential bundle back to the service. Must succeed
    /// before the transport channel join is attempted.
    pub async fn activate_conversation(
        &self,
        credentials: &SessionCredentials,
        config: &ClientConfig,
    ) -> ClientResult<bool> {
        let url = self.endpoint(config, "/conversation/start")?;
        let body = serde_json::to_value(credentials)
            .map_err(|e| ClientError::invalid_response(format!("encoding credentials: {}", e)))?;

        tracing::debug!(
            channel = %credentials.communication_channel,
            "activating conversation"
        );
        let response = self.post_json(url, &config.api_key, &body).await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::ConversationError { status: status.as_u16() });
        }
        Ok(true)
    }

    /// End a conversation on the backend
    ///
    /// Posts the minimal teardown payload: the session identifier and the
    /// channel it was bridged onto.
    pub async fn end_conversation(
        &self,
        credentials: &SessionCredentials,
        config: &ClientConfig,
    ) -> ClientResult<bool> {
        let url = self.endpoint(config, "/conversation/end")?;
        let body = serde_json::json!({
            "sdrtnId": credentials.sdrtn_id,
            "communicationChannel": credentials.communication_channel,
        });

        tracing::debug!(
            channel = %credentials.communication_channel,
            "ending conversation"
        );
        let response = self.post_json(url, &config.api_key, &body).await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::ConversationError { status: status.as_u16() });
        }
        Ok(true)
    }

    /// Build and validate an endpoint URL before any I/O happens
    fn endpoint(&self, config: &ClientConfig, suffix: &str) -> ClientResult<Url> {
        let raw = format!("{}{}", config.service_url.trim_end_matches('/'), suffix);
        Url::parse(&raw).map_err(|_| ClientError::InvalidUrl { url: raw })
    }

    /// POST a JSON body with the API key header set
    async fn post_json(
        &self,
        url: Url,
        api_key: &str,
        body: &serde_json::Value,
    ) -> ClientResult<reqwest::Response> {
        self.http
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::invalid_response(e.to_string()))
    }

    /// Map a negotiation response to credentials or its failure error
    async fn decode_credentials(response: reqwest::Response) -> ClientResult<SessionCredentials> {
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::NetworkError { status: status.as_u16() });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::invalid_response(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!(error = %e, "credentials response failed schema validation");
            ClientError::InvalidToken
        })
    }
}

impl Default for ConversationService {
    fn default() -> Self {
        Self::new()
    }
}
