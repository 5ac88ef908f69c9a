//! Gated playback state machine.
//!
//! [`PlaybackController`] owns the [`PlaybackState`] and the access flag set
//! by the latest verdict. Play/Pause and Seek are gated on that flag; Mute
//! is not. An invalid verdict pauses the transport and moves the status to
//! [`PlaybackStatus::Blocked`] in the same critical section that records it.

mod transport;

pub use transport::{MediaTransport, PlaybackRejected, SimulatedTransport, TransportEvent};

use crate::validator::AccessGate;
use parking_lot::Mutex;
use std::sync::Arc;
use streamgate_common::{PlaybackState, PlaybackStatus, Verdict};

pub struct PlaybackController {
    transport: Arc<dyn MediaTransport>,
    inner: Mutex<ControllerState>,
}

#[derive(Debug, Default)]
struct ControllerState {
    playback: PlaybackState,
    access: bool,
}

impl PlaybackController {
    /// A controller in [`PlaybackStatus::Idle`] with access not yet granted.
    pub fn new(transport: Arc<dyn MediaTransport>) -> Self {
        let playback = PlaybackState {
            muted: transport.is_muted(),
            ..Default::default()
        };
        Self {
            transport,
            inner: Mutex::new(ControllerState {
                playback,
                access: false,
            }),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.lock().playback.clone()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.inner.lock().playback.status
    }

    /// Whether gated controls currently have any effect.
    pub fn access_granted(&self) -> bool {
        self.inner.lock().access
    }

    /// Toggle between playing and paused. Ignored without access.
    ///
    /// A transport that refuses to play is not trusted: the status is
    /// reconciled with the transport's own paused flag.
    pub fn toggle_play(&self) -> PlaybackStatus {
        let mut inner = self.inner.lock();
        if !inner.access {
            tracing::debug!(status = %inner.playback.status, "Play/pause ignored: access not granted");
            return inner.playback.status;
        }

        if self.transport.is_paused() {
            match self.transport.play() {
                Ok(()) => inner.playback.status = PlaybackStatus::Playing,
                Err(e) => {
                    tracing::error!(error = %e, "Error toggling playback");
                    inner.playback.status = self.reconciled_status(inner.playback.status);
                }
            }
        } else {
            self.transport.pause();
            inner.playback.status = PlaybackStatus::Paused;
        }

        inner.playback.status
    }

    /// Move to `position`, clamped into `[0, duration]`. Ignored without
    /// access; returns the applied position otherwise.
    pub fn seek(&self, position: f64) -> Option<f64> {
        let mut inner = self.inner.lock();
        if !inner.access {
            tracing::debug!(position, "Seek ignored: access not granted");
            return None;
        }

        let position = inner.playback.clamp_position(position);
        self.transport.set_current_position(position);
        inner.playback.position = position;
        Some(position)
    }

    /// Flip the mute flag. Always available; returns the new flag.
    pub fn toggle_mute(&self) -> bool {
        let mut inner = self.inner.lock();
        let muted = !inner.playback.muted;
        self.transport.set_muted(muted);
        inner.playback.muted = muted;
        muted
    }

    pub fn on_metadata_loaded(&self, duration: f64) {
        let mut inner = self.inner.lock();
        inner.playback.duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        let position = inner.playback.position;
        inner.playback.position = inner.playback.clamp_position(position);
        tracing::debug!(duration = inner.playback.duration, "Media metadata loaded");
    }

    /// Record transport progress. Ignored while blocked.
    pub fn on_progress(&self, position: f64) {
        let mut inner = self.inner.lock();
        if inner.playback.status == PlaybackStatus::Blocked {
            return;
        }
        inner.playback.position = inner.playback.clamp_position(position);

        // The transport stops by itself at the end of the media.
        if inner.playback.status == PlaybackStatus::Playing && self.transport.is_paused() {
            inner.playback.status = PlaybackStatus::Paused;
        }
    }

    pub fn on_transport_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::MetadataLoaded { duration } => self.on_metadata_loaded(duration),
            TransportEvent::Progress { position } => self.on_progress(position),
        }
    }

    /// Forget position and duration after the transport was pointed at a
    /// different source. A blocked player stays blocked.
    pub fn on_source_changed(&self) {
        let mut inner = self.inner.lock();
        inner.playback.position = 0.0;
        inner.playback.duration = 0.0;
        if inner.playback.status != PlaybackStatus::Blocked {
            inner.playback.status = PlaybackStatus::Idle;
        }
    }

    fn reconciled_status(&self, current: PlaybackStatus) -> PlaybackStatus {
        if !self.transport.is_paused() {
            PlaybackStatus::Playing
        } else if current == PlaybackStatus::Idle {
            PlaybackStatus::Idle
        } else {
            PlaybackStatus::Paused
        }
    }
}

impl AccessGate for PlaybackController {
    fn apply_verdict(&self, verdict: &Verdict) {
        let mut inner = self.inner.lock();

        if verdict.is_valid {
            inner.access = true;
            if inner.playback.status == PlaybackStatus::Blocked {
                inner.playback.status = if inner.playback.position > 0.0 {
                    PlaybackStatus::Paused
                } else {
                    PlaybackStatus::Idle
                };
                tracing::info!(status = %inner.playback.status, "Playback unblocked");
            }
            return;
        }

        inner.access = false;
        if !self.transport.is_paused() {
            self.transport.pause();
        }
        if inner.playback.status != PlaybackStatus::Blocked {
            tracing::info!(
                previous = %inner.playback.status,
                reason = %verdict.message,
                "Playback blocked"
            );
            inner.playback.status = PlaybackStatus::Blocked;
        }
    }
}
