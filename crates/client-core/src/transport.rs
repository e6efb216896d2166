//! Audio transport contract for the voice client
//!
//! The session manager never talks to a media engine directly; it drives an
//! [`AudioTransport`] implementation and consumes [`TransportEvent`]s the
//! implementation pushes back over a channel handed to it at `initialize`.
//! This keeps the engine integration (and its threading model) entirely
//! behind one seam: engine callbacks become channel sends, and the manager
//! serializes them with its own API calls.
//!
//! The transport is one shared instance reused across sessions. The manager
//! calls `destroy` on every successful teardown and issues a fresh
//! `initialize` before the next join.
//!
//! Join completion is asynchronous: `join` only reports whether the request
//! was submitted (zero) or rejected synchronously (non-zero); the actual
//! channel entry is signaled later by [`TransportEvent::LocalJoined`].

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::ClientResult;
use crate::session::RemoteParticipantId;

/// Channel usage profile requested from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelProfile {
    /// Peer-to-peer call profile
    Communication,
    /// One-to-many live profile; the default for guide sessions
    LiveBroadcast,
}

/// Role of the local participant inside the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRole {
    /// Publishes audio into the channel
    Broadcaster,
    /// Listen-only participant
    Audience,
}

/// Options passed to the engine alongside a join request
#[derive(Debug, Clone)]
pub struct ChannelOptions {
    pub profile: ChannelProfile,
    pub role: ClientRole,
    /// Publish the local microphone track on join
    pub publish_microphone: bool,
    /// Automatically subscribe to remote audio tracks
    pub auto_subscribe_audio: bool,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            profile: ChannelProfile::LiveBroadcast,
            role: ClientRole::Broadcaster,
            publish_microphone: true,
            auto_subscribe_audio: true,
        }
    }
}

/// Events delivered by the transport back to the session manager
///
/// These arrive on transport-owned threads/tasks; implementations send them
/// into the channel received at `initialize` and the manager serializes them
/// with its own state mutations.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The local user entered the channel; completes a pending join request
    LocalJoined { channel: String, user_id: u32 },
    /// A remote participant entered the channel
    RemoteJoined { participant: RemoteParticipantId },
    /// A remote participant left the channel
    RemoteLeft { participant: RemoteParticipantId },
    /// The engine reported a runtime fault
    EngineError { code: i32 },
    /// A remote participant muted or unmuted their audio
    RemoteMuteChanged { participant: RemoteParticipantId, muted: bool },
}

/// Contract between the session manager and the real-time audio engine
#[async_trait]
pub trait AudioTransport: Send + Sync {
    /// Prepare the engine for a session using the application identifier from
    /// the negotiated credentials. Events for the upcoming session are
    /// delivered through `events`. Called before every join; implementations
    /// must tolerate re-initialization after `destroy`.
    async fn initialize(
        &self,
        app_id: &str,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> ClientResult<()>;

    /// Submit a channel join request. Returns `0` when the request was
    /// accepted for processing; any other value is a synchronous rejection.
    /// Completion is signaled later via [`TransportEvent::LocalJoined`].
    async fn join(&self, token: &str, channel: &str, user_id: u32, options: &ChannelOptions)
        -> i32;

    /// Leave the current channel, if any
    async fn leave(&self);

    /// Mute or unmute the local audio stream
    async fn mute_local(&self, muted: bool);

    /// Release the underlying engine resources; a fresh `initialize` must
    /// precede the next join
    async fn destroy(&self);
}

/// Platform microphone/recording permission check
///
/// Checked before every join request; a denial fails the session start
/// without contacting the transport.
#[async_trait]
pub trait RecordPermission: Send + Sync {
    async fn microphone_allowed(&self) -> bool;
}

/// Permission source that always grants; the default for platforms where
/// permission is handled outside this crate
#[derive(Debug, Default)]
pub struct AlwaysGranted;

#[async_trait]
impl RecordPermission for AlwaysGranted {
    async fn microphone_allowed(&self) -> bool {
        true
    }
}
