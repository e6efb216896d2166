//! Client-core: voice session coordination for the tour-guide feature
//!
//! This crate negotiates "ask the tour guide" conversation sessions with the
//! guidecall REST backend and bridges them onto a real-time audio transport,
//! exposing a small connection state machine and microphone controls to the
//! embedding application.
//!
//! ## Layer Separation
//! ```text
//! application/UI -> client-core -> {conversation REST backend, audio transport engine}
//! ```
//!
//! Client-core focuses on:
//! - Session lifecycle: negotiate, activate, join, teardown
//! - The single authoritative connection state and its transitions
//! - Mapping backend credentials onto transport channel operations
//! - Ordered event delivery for UI integration
//!
//! The media engine itself, device location acquisition, and all presentation
//! concerns live outside this crate, behind the [`transport::AudioTransport`]
//! seam and the [`events::SessionEventHandler`] observer.

pub mod client;
pub mod error;
pub mod events;
pub mod service;
pub mod session;
pub mod transport;

// Public API exports (only high-level client-core types)
pub use client::{ClientConfig, VoiceSessionBuilder, VoiceSessionManager, DEFAULT_SERVICE_URL};
pub use error::{ClientError, ClientResult};
pub use events::{
    ClientEvent, ConnectionStateInfo, MicrophoneStateInfo, RemoteMuteInfo, SessionEventHandler,
};
pub use service::{ConversationService, API_KEY_HEADER};
pub use session::{
    ConnectionState, GeoPoint, RemoteParticipantId, SessionCredentials, SessionSnapshot,
};
pub use transport::{
    AlwaysGranted, AudioTransport, ChannelOptions, ChannelProfile, ClientRole, RecordPermission,
    TransportEvent,
};

/// Client-core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
