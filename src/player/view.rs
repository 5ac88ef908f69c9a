//! Read-only snapshot of everything a front end renders for the player.

use serde::Serialize;
use streamgate_common::{PlaybackState, PlaybackStatus, UserMode, Verdict};

/// Overlay text used when an invalid verdict carries no message.
pub const RESTRICTED_FALLBACK: &str = "Your access to this video is restricted.";

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    /// `Validating with IP: <addr>` or `Validating with IP: Loading IP...`
    pub origin_banner: String,
    /// `Legitimate Mode` or `Pirate Mode`
    pub mode_label: String,
    pub mode: UserMode,
    pub username: Option<String>,
    pub verdict: Verdict,
    /// Access-denied overlay text; `None` while access is not denied.
    pub denied_overlay: Option<String>,
    pub controls_enabled: bool,
    pub playback: PlaybackState,
    /// Fraction of the media played, in `[0, 1]` once duration is known.
    pub progress: f64,
    /// `elapsed / total`
    pub time_label: String,
    pub play_label: &'static str,
    pub mute_label: &'static str,
}

impl PlayerView {
    pub(crate) fn build(
        origin: Option<&str>,
        mode: UserMode,
        username: Option<&str>,
        verdict: Verdict,
        playback: PlaybackState,
    ) -> Self {
        let denied_overlay = (verdict.is_settled() && !verdict.is_valid).then(|| {
            if verdict.message.is_empty() {
                RESTRICTED_FALLBACK.to_string()
            } else {
                verdict.message.clone()
            }
        });

        let total = if playback.duration_known() {
            playback.duration
        } else {
            1.0
        };

        Self {
            origin_banner: format!(
                "Validating with IP: {}",
                origin.unwrap_or("Loading IP...")
            ),
            mode_label: format!("{mode} Mode"),
            mode,
            username: username.map(str::to_string),
            controls_enabled: verdict.is_valid,
            denied_overlay,
            verdict,
            progress: playback.position / total,
            time_label: format!(
                "{} / {}",
                format_time(playback.position),
                format_time(playback.duration)
            ),
            play_label: if playback.status == PlaybackStatus::Playing {
                "Pause"
            } else {
                "Play"
            },
            mute_label: if playback.muted { "Unmute" } else { "Mute" },
            playback,
        }
    }
}

/// Format seconds as `m:ss`, or `h:mm:ss` from one hour on.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}
