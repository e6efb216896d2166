//! Session state and credentials for the voice client
//!
//! This module provides the connection state machine's data model and the
//! backend-issued credential bundle that authorizes a transport channel join.
//! All actual negotiation and transport operations live in the service client
//! and the session manager; the types here are deliberately passive.
//!
//! # State Transitions
//!
//! Typical session flow:
//! `Disconnected` → `Connecting` → `Connected` → `Disconnected`
//!
//! `Failed` can be entered from any in-progress state and, like
//! `Disconnected`, is resumable by starting a new session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Transport-assigned identifier of a remote channel participant
pub type RemoteParticipantId = u32;

/// A geographic coordinate pair attached to a negotiation request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Backend-issued credential bundle for one conversation session
///
/// Returned by the negotiation endpoints and posted back verbatim to the
/// activation endpoint. Immutable once received; the session manager owns the
/// only copy for the lifetime of a session and discards it on teardown.
///
/// Decoding is strict: a response missing any required field (or carrying a
/// mistyped one) does not produce a partial bundle, it fails decoding and is
/// surfaced as [`ClientError::InvalidToken`] by the service client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
    /// Numeric user identifier assigned by the backend for the transport join
    pub user_id: u32,
    /// Token authorizing the transport channel join
    pub conversation_token: String,
    /// Name of the real-time audio channel to join
    pub communication_channel: String,
    /// Coordinates the session was negotiated at
    pub geolocation: GeoPoint,
    /// Free-text description of the negotiated location
    pub location_info: String,
    /// Transport application identifier used to initialize the audio engine
    pub sdrtn_id: String,
    /// Backend tour identifier (tour sessions only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tour_id: Option<i64>,
    /// System-level tour identifier (tour sessions only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_tour_id: Option<String>,
    /// Free-text tour description (tour sessions only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tour_info: Option<String>,
}

/// Current state of the voice session connection
///
/// Exactly one instance exists per session manager, and every transition is
/// delivered to the registered observer exactly once, in transition order.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    /// No session negotiated; initial state
    Disconnected,
    /// Negotiation or channel join in progress
    Connecting,
    /// Joined the transport channel; `remote_participant` tracks the tour
    /// guide once the transport reports them
    Connected {
        remote_participant: Option<RemoteParticipantId>,
    },
    /// The session died; carries the causing error. Resumable via a new start
    Failed { error: ClientError },
}

impl ConnectionState {
    /// Check if the session is joined to the transport channel
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    /// Check if a new session start would be accepted in this state
    pub fn can_start(&self) -> bool {
        matches!(self, ConnectionState::Disconnected | ConnectionState::Failed { .. })
    }

    /// The tracked remote participant, if any
    pub fn remote_participant(&self) -> Option<RemoteParticipantId> {
        match self {
            ConnectionState::Connected { remote_participant } => *remote_participant,
            _ => None,
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected { remote_participant: Some(id) } => {
                write!(f, "Connected(remote={})", id)
            }
            ConnectionState::Connected { remote_participant: None } => write!(f, "Connected"),
            ConnectionState::Failed { error } => write!(f, "Failed({})", error),
        }
    }
}

/// Point-in-time view of a session for UIs and diagnostics
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Connection state at the time of the snapshot
    pub state: ConnectionState,
    /// Whether a credential bundle is currently held
    pub has_credentials: bool,
    /// Channel named by the held credentials, if any
    pub current_channel: Option<String>,
    /// Whether the local microphone stream is muted
    pub microphone_muted: bool,
    /// Tracked remote participant, if any
    pub remote_participant: Option<RemoteParticipantId>,
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
}
