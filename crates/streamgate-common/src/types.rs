//! Core type definitions for credentials, origins, verdicts and playback.
//!
//! Enums are serialized in lowercase; [`Verdict`] uses camelCase to match the
//! shape the authorization service speaks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque access token supplied by the caller for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Where a [`NetworkOrigin`] address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginProvenance {
    /// The navigable location carried the address.
    CallerProvided,
    /// No address was present; the fixed default was assigned.
    Defaulted,
}

impl fmt::Display for OriginProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CallerProvided => write!(f, "caller-provided"),
            Self::Defaulted => write!(f, "defaulted"),
        }
    }
}

/// The network address attributed to the playback request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkOrigin {
    pub address: String,
    pub provenance: OriginProvenance,
}

impl NetworkOrigin {
    pub fn caller_provided<S: Into<String>>(address: S) -> Self {
        Self {
            address: address.into(),
            provenance: OriginProvenance::CallerProvided,
        }
    }

    pub fn defaulted<S: Into<String>>(address: S) -> Self {
        Self {
            address: address.into(),
            provenance: OriginProvenance::Defaulted,
        }
    }
}

impl fmt::Display for NetworkOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.provenance)
    }
}

/// Coarse identity classification shown next to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserMode {
    /// A username accompanies the session.
    Legitimate,
    /// No username was supplied.
    Pirate,
}

impl UserMode {
    /// Classify a session by the presence of a non-empty username.
    pub fn derive(username: Option<&str>) -> Self {
        match username {
            Some(name) if !name.is_empty() => Self::Legitimate,
            _ => Self::Pirate,
        }
    }
}

impl fmt::Display for UserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legitimate => write!(f, "Legitimate"),
            Self::Pirate => write!(f, "Pirate"),
        }
    }
}

/// Playback status of the gated player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// Nothing has been played yet.
    #[default]
    Idle,
    Playing,
    Paused,
    /// Access was denied; gated controls are inert.
    Blocked,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Playing => write!(f, "playing"),
            Self::Paused => write!(f, "paused"),
            Self::Blocked => write!(f, "blocked"),
        }
    }
}

/// Snapshot of the player as seen by the controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    /// Seconds from the start of the media.
    pub position: f64,
    /// Total length in seconds; `0.0` while unknown.
    pub duration: f64,
    pub muted: bool,
}

impl PlaybackState {
    /// Whether the duration has been reported by the transport.
    pub fn duration_known(&self) -> bool {
        self.duration > 0.0
    }

    /// Clamp a requested position into `[0, duration]`.
    ///
    /// With an unknown duration only the lower bound applies. Non-finite
    /// input maps to `0.0`.
    pub fn clamp_position(&self, position: f64) -> f64 {
        if !position.is_finite() {
            return 0.0;
        }
        if self.duration_known() {
            position.clamp(0.0, self.duration)
        } else {
            position.max(0.0)
        }
    }
}

/// Latest published access decision.
///
/// `is_valid` and `message` always change together. `checked_at` is `None`
/// until the first decision has been made for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_valid: bool,
    pub message: String,
    pub checked_at: Option<DateTime<Utc>>,
}

impl Verdict {
    /// No decision yet; treated as not permitted to play.
    pub fn pending() -> Self {
        Self {
            is_valid: false,
            message: String::new(),
            checked_at: None,
        }
    }

    pub fn new<S: Into<String>>(is_valid: bool, message: S) -> Self {
        Self {
            is_valid,
            message: message.into(),
            checked_at: Some(Utc::now()),
        }
    }

    pub fn valid<S: Into<String>>(message: S) -> Self {
        Self::new(true, message)
    }

    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::new(false, message)
    }

    /// Whether a decision has been published.
    pub fn is_settled(&self) -> bool {
        self.checked_at.is_some()
    }

    /// Compare the decision itself, ignoring when it was made.
    pub fn same_decision(&self, other: &Verdict) -> bool {
        self.is_valid == other.is_valid && self.message == other.message
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self::pending()
    }
}
