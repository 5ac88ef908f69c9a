//! Session identity classification.
//!
//! The mode is never stored: it is derived from the username every time it
//! is read, so it cannot drift from its source.

use streamgate_common::{SessionId, UserMode};

/// Derive the display mode for a username.
///
/// Non-empty usernames are [`UserMode::Legitimate`]; an empty string is
/// [`UserMode::Pirate`].
pub fn derive_mode(username: &str) -> UserMode {
    UserMode::derive(Some(username))
}

/// Identity of the viewer for one player session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    id: SessionId,
    username: Option<String>,
}

impl SessionContext {
    pub fn new(username: Option<String>) -> Self {
        Self {
            id: SessionId::new(),
            username: username.filter(|name| !name.is_empty()),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Replace the username; the mode follows on the next read.
    pub fn set_username(&mut self, username: Option<String>) {
        let username = username.filter(|name| !name.is_empty());
        if self.username != username {
            tracing::debug!(
                session_id = %self.id,
                mode = %UserMode::derive(username.as_deref()),
                "Session username changed"
            );
        }
        self.username = username;
    }

    pub fn mode(&self) -> UserMode {
        UserMode::derive(self.username())
    }

    /// Label shown next to the player, e.g. `Legitimate Mode`.
    pub fn mode_label(&self) -> String {
        format!("{} Mode", self.mode())
    }
}
