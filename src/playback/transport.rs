//! Media-transport seam.
//!
//! The transport is the decoder/renderer that actually plays bytes. The
//! controller only drives it through [`MediaTransport`] and is told about
//! metadata and progress through [`TransportEvent`]s.

use parking_lot::Mutex;

/// The transport refused to start playback (e.g. an autoplay policy).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("playback rejected: {0}")]
pub struct PlaybackRejected(pub String);

/// Capabilities the controller consumes from the media transport.
pub trait MediaTransport: Send + Sync {
    fn play(&self) -> Result<(), PlaybackRejected>;
    fn pause(&self);
    fn is_paused(&self) -> bool;

    fn set_current_position(&self, position: f64);

    fn is_muted(&self) -> bool;
    fn set_muted(&self, muted: bool);

    /// Point the transport at a new source, or unload it with `None`.
    fn set_source(&self, source: Option<&str>);
}

/// Notification emitted by a transport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    MetadataLoaded { duration: f64 },
    Progress { position: f64 },
}

/// Clock-driven stand-in transport.
///
/// Playback advances only when [`tick`](Self::tick) is called, which makes
/// it usable both from the CLI (driven by a timer) and from tests.
#[derive(Debug)]
pub struct SimulatedTransport {
    media_duration: f64,
    inner: Mutex<SimulatedState>,
}

#[derive(Debug, Default)]
struct SimulatedState {
    source: Option<String>,
    paused: bool,
    position: f64,
    duration: f64,
    muted: bool,
    metadata_reported: bool,
    reject_play: Option<String>,
    play_calls: usize,
    pause_calls: usize,
}

impl SimulatedTransport {
    /// A transport whose sources all report `media_duration` seconds.
    pub fn new(media_duration: f64) -> Self {
        Self {
            media_duration,
            inner: Mutex::new(SimulatedState {
                paused: true,
                ..Default::default()
            }),
        }
    }

    /// Make subsequent `play` calls fail with `reason`, or succeed again with
    /// `None`.
    pub fn reject_play(&self, reason: Option<&str>) {
        self.inner.lock().reject_play = reason.map(str::to_string);
    }

    pub fn source(&self) -> Option<String> {
        self.inner.lock().source.clone()
    }

    /// Playback position in seconds.
    pub fn position(&self) -> f64 {
        self.inner.lock().position
    }

    pub fn play_calls(&self) -> usize {
        self.inner.lock().play_calls
    }

    pub fn pause_calls(&self) -> usize {
        self.inner.lock().pause_calls
    }

    /// Advance the clock by `elapsed` seconds and collect notifications.
    ///
    /// The first tick after a source is loaded reports its metadata. Playback
    /// that reaches the end pauses.
    pub fn tick(&self, elapsed: f64) -> Vec<TransportEvent> {
        let mut state = self.inner.lock();
        let mut events = Vec::new();

        if state.source.is_none() {
            return events;
        }

        if !state.metadata_reported {
            state.metadata_reported = true;
            state.duration = self.media_duration;
            events.push(TransportEvent::MetadataLoaded {
                duration: state.duration,
            });
        }

        if !state.paused {
            state.position = (state.position + elapsed).min(state.duration);
            if state.position >= state.duration {
                state.paused = true;
            }
            events.push(TransportEvent::Progress {
                position: state.position,
            });
        }

        events
    }
}

impl MediaTransport for SimulatedTransport {
    fn play(&self) -> Result<(), PlaybackRejected> {
        let mut state = self.inner.lock();
        state.play_calls += 1;
        if let Some(reason) = state.reject_play.clone() {
            return Err(PlaybackRejected(reason));
        }
        if state.source.is_none() {
            return Err(PlaybackRejected("no source loaded".into()));
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&self) {
        let mut state = self.inner.lock();
        state.pause_calls += 1;
        state.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.inner.lock().paused
    }

    fn set_current_position(&self, position: f64) {
        self.inner.lock().position = position;
    }

    fn is_muted(&self) -> bool {
        self.inner.lock().muted
    }

    fn set_muted(&self, muted: bool) {
        self.inner.lock().muted = muted;
    }

    fn set_source(&self, source: Option<&str>) {
        let mut state = self.inner.lock();
        state.source = source.map(str::to_string);
        state.paused = true;
        state.position = 0.0;
        state.duration = 0.0;
        state.metadata_reported = false;
    }
}
