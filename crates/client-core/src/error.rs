//! Error types and handling for the client-core library
//!
//! This module defines all error types that can occur while negotiating and
//! running a voice session, and provides guidance on how to handle them.
//!
//! # Error Categories
//!
//! Errors are categorized to help with recovery strategies:
//!
//! - **Negotiation Errors** - The REST backend rejected or mangled a
//!   credentials exchange; usually recoverable by starting a new session
//! - **Conversation Errors** - The activation/teardown endpoints returned a
//!   failure status; the session may need to be stopped or restarted
//! - **Transport Errors** - The real-time audio engine rejected a request or
//!   reported a runtime fault
//! - **Permission Errors** - The platform denied microphone access; requires
//!   user intervention, not a retry
//! - **State Errors** - Invalid operation for the current connection state
//!
//! # Error Handling Guide
//!
//! ```rust,no_run
//! # use guidecall_client_core::{VoiceSessionManager, ClientError, GeoPoint};
//! # use std::sync::Arc;
//! # async fn example(manager: Arc<VoiceSessionManager>) {
//! match manager.start_tour_session("user-123", 42, GeoPoint::new(37.7749, -122.4194)).await {
//!     Ok(()) => {
//!         println!("Negotiation complete, waiting for the channel join");
//!     }
//!     Err(ClientError::NetworkError { status }) => {
//!         eprintln!("Backend rejected negotiation with HTTP {}", status);
//!         // Check connectivity and credentials, then start a new session
//!     }
//!     Err(ClientError::MicrophonePermissionDenied) => {
//!         eprintln!("Microphone access denied");
//!         // Send the user to the system permission settings
//!     }
//!     Err(e) => {
//!         eprintln!("Session start failed: {}", e);
//!     }
//! }
//! # }
//! ```
//!
//! Every error raised inside `start_*`/`stop_session` is both returned to the
//! caller and reflected as a `Failed` state transition carrying the same
//! error, so observers and callers always agree on why a session died.

use thiserror::Error;

/// Result type alias for client-core operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Comprehensive error types for voice session operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Negotiation endpoint configuration is malformed; detected before any
    /// network call is attempted
    #[error("Invalid service URL: {url}")]
    InvalidUrl { url: String },

    /// The transport-level exchange failed: connection refused, read error,
    /// or a response that was not HTTP at all
    #[error("Invalid response from server: {reason}")]
    InvalidResponse { reason: String },

    /// The negotiation endpoint returned a non-success status code
    #[error("Network error: status code {status}")]
    NetworkError { status: u16 },

    /// The negotiation response body did not match the credentials schema
    #[error("Invalid conversation token")]
    InvalidToken,

    /// The activation or teardown endpoint returned a non-success status code
    #[error("Conversation error: status code {status}")]
    ConversationError { status: u16 },

    /// Microphone/recording permission was denied by the platform
    #[error("Microphone permission is required for a voice session")]
    MicrophonePermissionDenied,

    /// The transport rejected a join request synchronously, or conversation
    /// activation was not acknowledged
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    /// The transport engine reported a runtime fault
    #[error("Engine error: code {code}")]
    EngineError { code: i32 },

    /// A session start was rejected because one is already in flight
    #[error("Session already active: current state is {state}")]
    SessionAlreadyActive { state: String },

    /// Configuration errors
    #[error("Missing required configuration: {field}")]
    MissingConfiguration { field: String },
}

impl ClientError {
    /// Create an invalid-response error
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse { reason: reason.into() }
    }

    /// Create a connection-failed error
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        Self::ConnectionFailed { reason: reason.into() }
    }

    /// Check if this error is recoverable by starting a new session
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Transient network or backend conditions
            ClientError::InvalidResponse { .. }
            | ClientError::NetworkError { .. }
            | ClientError::ConversationError { .. }
            | ClientError::ConnectionFailed { .. }
            | ClientError::EngineError { .. } => true,

            // Require caller or user intervention first
            ClientError::InvalidUrl { .. }
            | ClientError::InvalidToken
            | ClientError::MicrophonePermissionDenied
            | ClientError::SessionAlreadyActive { .. }
            | ClientError::MissingConfiguration { .. } => false,
        }
    }

    /// Check if error indicates a permission issue
    pub fn is_permission_error(&self) -> bool {
        matches!(self, ClientError::MicrophonePermissionDenied)
    }

    /// Get error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            ClientError::InvalidUrl { .. }
            | ClientError::InvalidResponse { .. }
            | ClientError::NetworkError { .. }
            | ClientError::InvalidToken => "negotiation",

            ClientError::ConversationError { .. } => "conversation",

            ClientError::ConnectionFailed { .. } | ClientError::EngineError { .. } => "transport",

            ClientError::MicrophonePermissionDenied => "permission",

            ClientError::SessionAlreadyActive { .. } => "state",

            ClientError::MissingConfiguration { .. } => "configuration",
        }
    }
}
