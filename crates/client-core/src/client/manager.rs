//! Voice session manager: the connection state machine owner
//!
//! The `VoiceSessionManager` is the primary entry point of this crate. It
//! sequences the two-step REST negotiation, bridges the negotiated
//! credentials onto the real-time audio transport, and owns the single
//! authoritative [`ConnectionState`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────┐
//! │   Application / UI      │
//! └───────────┬─────────────┘
//!             │ start / stop / toggle_microphone        events ▲
//! ┌───────────▼─────────────────────────────────────────────────┐
//! │   VoiceSessionManager                                       │
//! │ ┌──────────────────┐  ┌────────────────┐  ┌──────────────┐  │
//! │ │ state machine    │  │ Conversation   │  │ Event        │  │
//! │ │ (one mutex)      │  │ Service (REST) │  │ Dispatcher   │  │
//! │ └──────────────────┘  └────────────────┘  └──────────────┘  │
//! └───────────┬─────────────────────────────────────────────────┘
//!             │ initialize / join / leave / mute    events ▲
//! ┌───────────▼─────────────┐
//! │   AudioTransport        │
//! └─────────────────────────┘
//! ```
//!
//! # Ownership and Concurrency
//!
//! One manager owns at most one active session. This is an intentional
//! invariant, not an accident of implementation: a second `start_*` while a
//! session is negotiating or connected is rejected, never queued. All state
//! mutations (API calls and transport events alike) are serialized through a
//! single mutex; network calls suspend without holding it, with the
//! `Connecting` state itself acting as the negotiation-in-flight guard.
//!
//! No internal timeouts are enforced on the REST calls or on the wait for
//! the join confirmation; a hang in either leaves the state `Connecting`
//! until the caller stops the session.
//!
//! # Usage
//!
//! ```rust,no_run
//! # use guidecall_client_core::{VoiceSessionBuilder, AudioTransport, GeoPoint};
//! # use std::sync::Arc;
//! # async fn example(transport: Arc<dyn AudioTransport>) -> Result<(), Box<dyn std::error::Error>> {
//! let manager = VoiceSessionBuilder::new("api-key")
//!     .transport(transport)
//!     .build()
//!     .await?;
//!
//! manager
//!     .start_tour_session("user-123", 42, GeoPoint::new(37.7749, -122.4194))
//!     .await?;
//! // ... the joined event drives Connecting -> Connected ...
//! manager.stop_session().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::client::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::events::{ClientEvent, ConnectionStateInfo, EventDispatcher, SessionEventHandler};
use crate::service::ConversationService;
use crate::session::{
    ConnectionState, GeoPoint, RemoteParticipantId, SessionCredentials, SessionSnapshot,
};
use crate::transport::{AudioTransport, ChannelOptions, RecordPermission, TransportEvent};

/// Mutable session state guarded by the manager's mutex
pub(crate) struct SessionInner {
    pub(crate) state: ConnectionState,
    pub(crate) credentials: Option<SessionCredentials>,
    pub(crate) microphone_muted: bool,
    /// Whether the transport has been initialized since the last destroy
    pub(crate) transport_ready: bool,
    /// Guard against concurrent teardowns
    pub(crate) stop_in_flight: bool,
}

impl SessionInner {
    /// The remote participant currently tracked by the state machine
    pub(crate) fn tracked_remote(&self) -> Option<RemoteParticipantId> {
        self.state.remote_participant()
    }
}

/// High-level voice session manager coordinating negotiation, transport, and
/// event delivery
pub struct VoiceSessionManager {
    pub(crate) config: ClientConfig,
    pub(crate) service: ConversationService,
    pub(crate) transport: Arc<dyn AudioTransport>,
    pub(crate) permission: Arc<dyn RecordPermission>,
    pub(crate) inner: Mutex<SessionInner>,
    pub(crate) dispatcher: EventDispatcher,
    /// Sender handed to the transport at every initialize; the paired
    /// receiver feeds the ingestion task
    pub(crate) transport_tx: mpsc::UnboundedSender<TransportEvent>,
}

impl std::fmt::Debug for VoiceSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceSessionManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl VoiceSessionManager {
    /// Create a new session manager
    ///
    /// Spawns the transport event ingestion task and the event dispatch
    /// task; both hold weak references, so dropping the returned `Arc` (and
    /// its clones) shuts them down.
    pub async fn new(
        config: ClientConfig,
        transport: Arc<dyn AudioTransport>,
        permission: Arc<dyn RecordPermission>,
    ) -> Arc<Self> {
        let (transport_tx, mut transport_rx) = mpsc::unbounded_channel::<TransportEvent>();

        let manager = Arc::new(Self {
            config,
            service: ConversationService::new(),
            transport,
            permission,
            inner: Mutex::new(SessionInner {
                state: ConnectionState::Disconnected,
                credentials: None,
                microphone_muted: false,
                transport_ready: false,
                stop_in_flight: false,
            }),
            dispatcher: EventDispatcher::spawn(),
            transport_tx,
        });

        let weak = Arc::downgrade(&manager);
        tokio::spawn(async move {
            while let Some(event) = transport_rx.recv().await {
                let Some(manager) = weak.upgrade() else { break };
                manager.handle_transport_event(event).await;
            }
        });

        manager
    }

    /// Register the single session observer, replacing any previous one
    pub async fn set_event_handler(&self, handler: Arc<dyn SessionEventHandler>) {
        self.dispatcher.set_handler(handler).await;
    }

    /// Start a voice session for a specific tour
    ///
    /// Negotiates credentials with the tour endpoint, activates the
    /// conversation, and submits the transport channel join. Returns once
    /// the join request is accepted; the `Connecting → Connected` transition
    /// is driven later by the transport's joined event.
    ///
    /// # Errors
    ///
    /// * `SessionAlreadyActive` - a session is already connecting/connected
    /// * `NetworkError` / `InvalidToken` / `InvalidUrl` / `InvalidResponse` -
    ///   credential negotiation failed
    /// * `ConversationError` - the backend refused to activate the session
    /// * `MicrophonePermissionDenied` - recording permission is missing
    /// * `ConnectionFailed` - the transport rejected the join synchronously
    ///
    /// Every failure is also reflected as a `Failed` state transition
    /// carrying the same error.
    pub async fn start_tour_session(
        &self,
        user_id: &str,
        tour_id: u32,
        location: GeoPoint,
    ) -> ClientResult<()> {
        self.start_with(user_id, Some(tour_id), location).await
    }

    /// Start a voice session without a tour context
    ///
    /// Same lifecycle as [`start_tour_session`](Self::start_tour_session),
    /// negotiated against the generic credentials endpoint.
    pub async fn start_session(&self, user_id: &str, location: GeoPoint) -> ClientResult<()> {
        self.start_with(user_id, None, location).await
    }

    async fn start_with(
        &self,
        user_id: &str,
        tour_id: Option<u32>,
        location: GeoPoint,
    ) -> ClientResult<()> {
        let attempt = Uuid::new_v4();

        {
            let mut inner = self.inner.lock().await;
            if !inner.state.can_start() {
                tracing::warn!(%attempt, state = %inner.state, "rejecting re-entrant session start");
                return Err(ClientError::SessionAlreadyActive { state: inner.state.to_string() });
            }
            // Fresh negotiation: nothing from a previous session survives.
            inner.credentials = None;
            inner.microphone_muted = false;
            self.transition(
                &mut inner,
                ConnectionState::Connecting,
                Some("session start requested".to_string()),
            );
        }

        tracing::info!(%attempt, user_id, ?tour_id, "starting voice session");
        match self.negotiate(attempt, user_id, tour_id, location).await {
            Ok(()) => Ok(()),
            Err(error) => {
                tracing::error!(%attempt, error = %error, category = error.category(), "session start failed");
                let mut inner = self.inner.lock().await;
                self.transition(&mut inner, ConnectionState::Failed { error: error.clone() }, None);
                Err(error)
            }
        }
    }

    /// Run the negotiation sequence; the caller maps any error to `Failed`
    async fn negotiate(
        &self,
        attempt: Uuid,
        user_id: &str,
        tour_id: Option<u32>,
        location: GeoPoint,
    ) -> ClientResult<()> {
        // 1. Fetch the credential bundle
        let credentials = match tour_id {
            Some(tour) => {
                self.service
                    .fetch_tour_credentials(user_id, tour, location, &self.config)
                    .await?
            }
            None => self.service.fetch_credentials(user_id, location, &self.config).await?,
        };
        tracing::info!(
            %attempt,
            channel = %credentials.communication_channel,
            transport_uid = credentials.user_id,
            "conversation credentials received"
        );

        // 2. Prepare the transport with the backend-issued application id
        self.transport
            .initialize(&credentials.sdrtn_id, self.transport_tx.clone())
            .await?;
        {
            let mut inner = self.inner.lock().await;
            inner.credentials = Some(credentials.clone());
            inner.transport_ready = true;
        }

        // 3. Activate the conversation on the backend
        let activated = self.service.activate_conversation(&credentials, &self.config).await?;
        if !activated {
            return Err(ClientError::connection_failed("conversation activation not acknowledged"));
        }

        // 4. Recording permission gates the join, not the negotiation
        if !self.permission.microphone_allowed().await {
            return Err(ClientError::MicrophonePermissionDenied);
        }

        // 5. Submit the channel join; completion arrives as a transport event
        let code = self
            .transport
            .join(
                &credentials.conversation_token,
                &credentials.communication_channel,
                credentials.user_id,
                &ChannelOptions::default(),
            )
            .await;
        if code != 0 {
            return Err(ClientError::connection_failed(format!(
                "join request rejected with code {}",
                code
            )));
        }

        tracing::debug!(%attempt, "join submitted, awaiting transport confirmation");
        Ok(())
    }

    /// Stop the active session
    ///
    /// Ends the conversation on the backend, then leaves the transport
    /// channel, destroys the engine, and resets to `Disconnected`. A no-op
    /// when no credentials are held (nothing was negotiated) or while
    /// another teardown is already in flight.
    ///
    /// If the backend teardown fails, the error is returned and reflected as
    /// `Failed`, the transport session is left untouched, and the
    /// credentials are retained so the caller can retry.
    pub async fn stop_session(&self) -> ClientResult<()> {
        let credentials = {
            let mut inner = self.inner.lock().await;
            if inner.stop_in_flight {
                tracing::debug!("teardown already in flight, ignoring stop request");
                return Ok(());
            }
            match inner.credentials.clone() {
                Some(credentials) => {
                    inner.stop_in_flight = true;
                    credentials
                }
                None => {
                    tracing::debug!("stop requested without an active session");
                    return Ok(());
                }
            }
        };

        tracing::info!(channel = %credentials.communication_channel, "stopping voice session");
        if let Err(error) = self.service.end_conversation(&credentials, &self.config).await {
            tracing::error!(error = %error, "conversation teardown failed");
            let mut inner = self.inner.lock().await;
            inner.stop_in_flight = false;
            self.transition(
                &mut inner,
                ConnectionState::Failed { error: error.clone() },
                Some("conversation teardown failed".to_string()),
            );
            return Err(error);
        }

        self.transport.leave().await;
        self.transport.destroy().await;

        let mut inner = self.inner.lock().await;
        inner.credentials = None;
        inner.microphone_muted = false;
        inner.transport_ready = false;
        inner.stop_in_flight = false;
        self.transition(
            &mut inner,
            ConnectionState::Disconnected,
            Some("session ended".to_string()),
        );
        Ok(())
    }

    /// Current connection state
    pub async fn connection_state(&self) -> ConnectionState {
        self.inner.lock().await.state.clone()
    }

    /// Channel named by the held credentials, if a session is negotiated
    pub async fn current_channel(&self) -> Option<String> {
        self.inner
            .lock()
            .await
            .credentials
            .as_ref()
            .map(|c| c.communication_channel.clone())
    }

    /// Point-in-time view of the session for UIs and diagnostics
    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock().await;
        SessionSnapshot {
            state: inner.state.clone(),
            has_credentials: inner.credentials.is_some(),
            current_channel: inner
                .credentials
                .as_ref()
                .map(|c| c.communication_channel.clone()),
            microphone_muted: inner.microphone_muted,
            remote_participant: inner.tracked_remote(),
            taken_at: Utc::now(),
        }
    }

    /// Apply a state transition and emit exactly one notification for it
    ///
    /// Must be called with the inner lock held so transitions (and their
    /// notifications) observe a total order.
    pub(crate) fn transition(
        &self,
        inner: &mut SessionInner,
        new_state: ConnectionState,
        reason: Option<String>,
    ) {
        let previous = std::mem::replace(&mut inner.state, new_state.clone());
        tracing::info!(from = %previous, to = %new_state, "connection state changed");
        self.dispatcher.emit(ClientEvent::ConnectionStateChanged {
            info: ConnectionStateInfo {
                previous_state: Some(previous),
                new_state,
                reason,
                timestamp: Utc::now(),
            },
        });
    }
}
