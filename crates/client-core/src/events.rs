//! Event delivery for client-core operations
//!
//! This module provides the event system through which the session manager
//! reports progress to the embedding application: connection state changes,
//! session errors, and local/remote mute changes.
//!
//! # Delivery Guarantees
//!
//! - Exactly one [`ClientEvent::ConnectionStateChanged`] per state
//!   transition, in transition order
//! - All events are delivered on one dedicated task, regardless of which
//!   internal task or transport thread produced them, in emission order
//! - One registered observer at a time; registering a new handler replaces
//!   the previous one
//!
//! # Usage Example
//!
//! ```rust
//! use guidecall_client_core::events::{SessionEventHandler, ConnectionStateInfo};
//! use guidecall_client_core::error::ClientError;
//! use async_trait::async_trait;
//!
//! struct UiBridge;
//!
//! #[async_trait]
//! impl SessionEventHandler for UiBridge {
//!     async fn on_connection_state_changed(&self, info: ConnectionStateInfo) {
//!         println!("connection: {}", info.new_state);
//!     }
//!
//!     async fn on_session_error(&self, error: ClientError) {
//!         eprintln!("session error: {}", error);
//!     }
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use crate::error::ClientError;
use crate::session::{ConnectionState, RemoteParticipantId};

/// Information about a connection state transition
#[derive(Debug, Clone)]
pub struct ConnectionStateInfo {
    /// State before the transition, if there was one
    pub previous_state: Option<ConnectionState>,
    /// State after the transition
    pub new_state: ConnectionState,
    /// Human-readable cause, when one is known
    pub reason: Option<String>,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Information about a local microphone mute change
#[derive(Debug, Clone)]
pub struct MicrophoneStateInfo {
    /// Whether the local stream is now muted
    pub muted: bool,
    /// When the change occurred
    pub timestamp: DateTime<Utc>,
}

/// Information about a remote participant's mute change
#[derive(Debug, Clone)]
pub struct RemoteMuteInfo {
    /// The participant whose stream changed
    pub participant: RemoteParticipantId,
    /// Whether their stream is now muted
    pub muted: bool,
    /// When the change occurred
    pub timestamp: DateTime<Utc>,
}

/// Events emitted by the session manager
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The connection state machine moved
    ConnectionStateChanged { info: ConnectionStateInfo },
    /// An error not already implied by a state transition (or raised by the
    /// transport with no synchronous caller to return it to)
    SessionError { error: ClientError, timestamp: DateTime<Utc> },
    /// The local microphone mute state changed
    MicrophoneStateChanged { info: MicrophoneStateInfo },
    /// The tracked remote participant's mute state changed
    RemoteMuteChanged { info: RemoteMuteInfo },
}

/// Observer interface for session events
///
/// State and error callbacks are required; the mute callbacks default to
/// no-ops for observers that do not surface them.
#[async_trait]
pub trait SessionEventHandler: Send + Sync {
    /// Handle a connection state transition
    async fn on_connection_state_changed(&self, info: ConnectionStateInfo);

    /// Handle a session error
    async fn on_session_error(&self, error: ClientError);

    /// Handle a local microphone mute change
    async fn on_microphone_state_changed(&self, _info: MicrophoneStateInfo) {}

    /// Handle a remote participant mute change
    async fn on_remote_mute_changed(&self, _info: RemoteMuteInfo) {}

    /// Dispatch a raw event to the typed callbacks above
    async fn on_event(&self, event: ClientEvent) {
        match event {
            ClientEvent::ConnectionStateChanged { info } => {
                self.on_connection_state_changed(info).await
            }
            ClientEvent::SessionError { error, .. } => self.on_session_error(error).await,
            ClientEvent::MicrophoneStateChanged { info } => {
                self.on_microphone_state_changed(info).await
            }
            ClientEvent::RemoteMuteChanged { info } => self.on_remote_mute_changed(info).await,
        }
    }
}

/// Ordered, single-consumer event fan-out
///
/// Emission pushes into an unbounded channel; one dispatch task drains the
/// channel and invokes the registered handler sequentially, so observers see
/// events in emission order on a single execution context even though they
/// originate from API calls and transport threads alike.
pub(crate) struct EventDispatcher {
    tx: mpsc::UnboundedSender<ClientEvent>,
    handler: Arc<RwLock<Option<Arc<dyn SessionEventHandler>>>>,
}

impl EventDispatcher {
    /// Create the dispatcher and spawn its dispatch task
    pub(crate) fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<ClientEvent>();
        let handler: Arc<RwLock<Option<Arc<dyn SessionEventHandler>>>> =
            Arc::new(RwLock::new(None));

        let slot = Arc::clone(&handler);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let current = slot.read().await.as_ref().cloned();
                match current {
                    Some(h) => h.on_event(event).await,
                    None => {
                        tracing::debug!(?event, "no event handler registered, dropping event")
                    }
                }
            }
        });

        Self { tx, handler }
    }

    /// Queue an event for delivery; never blocks the emitter
    pub(crate) fn emit(&self, event: ClientEvent) {
        // Send only fails when the dispatch task is gone, i.e. at shutdown.
        let _ = self.tx.send(event);
    }

    /// Register the observer, replacing any previous one
    pub(crate) async fn set_handler(&self, handler: Arc<dyn SessionEventHandler>) {
        *self.handler.write().await = Some(handler);
    }
}
