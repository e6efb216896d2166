//! Transport event ingestion for the session manager
//!
//! Transport events arrive on an arbitrary context (engine threads, the
//! ingestion task) and are folded into the connection state machine here,
//! under the same mutex that serializes the API-driven mutations. The
//! transition table:
//!
//! ```text
//! Connecting + LocalJoined            -> Connected(remote=None)
//! Connected  + RemoteJoined(id)       -> Connected(remote=id)
//! Connected(id) + RemoteLeft(id)      -> Connected(remote=None)
//! Connected(id) + RemoteLeft(other)   -> no change
//! any        + EngineError(code)      -> Failed(EngineError)
//! Connected(id) + RemoteMuteChanged(id, m) -> notification only
//! ```
//!
//! Events that do not fit the table (a stale join confirmation after
//! teardown, a remote join before our own) are dropped with a log line;
//! they have no synchronous caller to fail.

use chrono::Utc;

use crate::error::ClientError;
use crate::events::{ClientEvent, RemoteMuteInfo};
use crate::session::ConnectionState;
use crate::transport::TransportEvent;

/// Transport event handling implementation for VoiceSessionManager
impl super::manager::VoiceSessionManager {
    /// Fold one transport event into the state machine
    pub(crate) async fn handle_transport_event(&self, event: TransportEvent) {
        let mut inner = self.inner.lock().await;
        match event {
            TransportEvent::LocalJoined { channel, user_id } => {
                if inner.state == ConnectionState::Connecting {
                    tracing::info!(%channel, user_id, "joined transport channel");
                    self.transition(
                        &mut inner,
                        ConnectionState::Connected { remote_participant: None },
                        None,
                    );
                } else {
                    tracing::debug!(%channel, state = %inner.state, "ignoring stale join confirmation");
                }
            }

            TransportEvent::RemoteJoined { participant } => {
                if inner.state.is_connected() {
                    tracing::info!(participant, "remote participant joined");
                    self.transition(
                        &mut inner,
                        ConnectionState::Connected { remote_participant: Some(participant) },
                        None,
                    );
                } else {
                    tracing::warn!(
                        participant,
                        state = %inner.state,
                        "remote participant reported outside an active session"
                    );
                }
            }

            TransportEvent::RemoteLeft { participant } => {
                match inner.tracked_remote() {
                    Some(tracked) if tracked == participant => {
                        tracing::info!(participant, "remote participant left");
                        self.transition(
                            &mut inner,
                            ConnectionState::Connected { remote_participant: None },
                            None,
                        );
                    }
                    tracked => {
                        tracing::debug!(
                            participant,
                            ?tracked,
                            "departure of untracked participant ignored"
                        );
                    }
                }
            }

            TransportEvent::EngineError { code } => {
                let error = ClientError::EngineError { code };
                tracing::error!(code, "transport engine reported an error");
                self.transition(
                    &mut inner,
                    ConnectionState::Failed { error: error.clone() },
                    Some("transport engine error".to_string()),
                );
                // No synchronous caller exists for engine faults; the error
                // notification is the only direct report.
                self.dispatcher.emit(ClientEvent::SessionError { error, timestamp: Utc::now() });
            }

            TransportEvent::RemoteMuteChanged { participant, muted } => {
                if inner.tracked_remote() == Some(participant) {
                    tracing::info!(participant, muted, "remote participant mute changed");
                    self.dispatcher.emit(ClientEvent::RemoteMuteChanged {
                        info: RemoteMuteInfo { participant, muted, timestamp: Utc::now() },
                    });
                } else {
                    tracing::debug!(participant, muted, "mute change for untracked participant ignored");
                }
            }
        }
    }
}
