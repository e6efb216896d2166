//! High-level voice session client implementation
//!
//! This module contains the session manager and its supporting pieces:
//!
//! - **`manager`** - The [`VoiceSessionManager`] owning the state machine and
//!   the start/stop lifecycle
//! - **`controls`** - Microphone mute operations
//! - **`events`** - Transport event ingestion onto the state machine
//! - **`config`** - Service endpoint and API key configuration
//! - **`builder`** - Fluent construction of a manager
//!
//! The lifecycle methods live in separate files as `impl` blocks on the
//! manager, so each concern reads on its own.

pub mod builder;
pub mod config;
pub mod controls;
pub mod events;
pub mod manager;

pub use builder::VoiceSessionBuilder;
pub use config::{ClientConfig, DEFAULT_SERVICE_URL};
pub use manager::VoiceSessionManager;
