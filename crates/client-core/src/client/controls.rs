// Microphone control operations for the session manager
//
// The local mute flag is independent of the connection state machine; it is
// applied to the transport's local stream and reported to the observer, but
// it never drives a connection state transition.

use chrono::Utc;

use crate::error::ClientResult;
use crate::events::{ClientEvent, MicrophoneStateInfo};

/// Microphone control implementation for VoiceSessionManager
impl super::manager::VoiceSessionManager {
    /// Flip the local microphone mute state
    ///
    /// Applies the new state to the transport's local stream and notifies
    /// the observer. A no-op (no transport call, no notification) when the
    /// transport has not been initialized since the last teardown.
    pub async fn toggle_microphone(&self) -> ClientResult<()> {
        let muted = {
            let mut inner = self.inner.lock().await;
            if !inner.transport_ready {
                tracing::debug!("microphone toggle ignored, transport not initialized");
                return Ok(());
            }
            inner.microphone_muted = !inner.microphone_muted;
            inner.microphone_muted
        };

        self.apply_mute(muted).await;
        Ok(())
    }

    /// Set the local microphone mute state explicitly
    ///
    /// Same semantics as [`toggle_microphone`](Self::toggle_microphone) with
    /// an absolute target instead of a flip.
    pub async fn set_microphone_muted(&self, muted: bool) -> ClientResult<()> {
        {
            let mut inner = self.inner.lock().await;
            if !inner.transport_ready {
                tracing::debug!(muted, "microphone change ignored, transport not initialized");
                return Ok(());
            }
            inner.microphone_muted = muted;
        }

        self.apply_mute(muted).await;
        Ok(())
    }

    /// Whether the local microphone stream is currently muted
    pub async fn is_microphone_muted(&self) -> bool {
        self.inner.lock().await.microphone_muted
    }

    async fn apply_mute(&self, muted: bool) {
        tracing::info!(muted, "local microphone state changed");
        self.transport.mute_local(muted).await;
        self.dispatcher.emit(ClientEvent::MicrophoneStateChanged {
            info: MicrophoneStateInfo { muted, timestamp: Utc::now() },
        });
    }
}
