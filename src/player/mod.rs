//! The composed, token-gated player.
//!
//! [`PlayerSession`] wires the pieces together for one viewer: the origin is
//! resolved from the location, the credential binds the media source, the
//! validator polls the authorization service, and the playback controller is
//! the validator's gate.

mod view;

pub use view::{format_time, PlayerView, RESTRICTED_FALLBACK};

use crate::auth::{AuthorizationService, RequestContext};
use crate::config::{Config, MediaConfig};
use crate::origin::{Location, OriginProvider};
use crate::playback::{MediaTransport, PlaybackController, TransportEvent};
use crate::session::SessionContext;
use crate::validator::CredentialValidator;
use reqwest::Url;
use std::sync::Arc;
use streamgate_common::{Credential, NetworkOrigin, PlaybackStatus, SessionId, Verdict};
use tokio::sync::watch;

/// Source URL of the gated asset for `credential`; `None` unloads the
/// transport.
pub fn media_source_url(media: &MediaConfig, credential: &Credential) -> Option<String> {
    if credential.is_empty() {
        return None;
    }

    let base = format!(
        "{}{}",
        media.base_url.trim_end_matches('/'),
        media.resource_path
    );
    match Url::parse(&base) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("token", credential.as_str());
            Some(url.to_string())
        }
        Err(e) => {
            tracing::warn!(base = %base, error = %e, "Invalid media source URL");
            None
        }
    }
}

pub struct PlayerSession {
    session: SessionContext,
    credential: Credential,
    origin: Option<NetworkOrigin>,
    origin_provider: OriginProvider,
    media: MediaConfig,
    transport: Arc<dyn MediaTransport>,
    controller: Arc<PlaybackController>,
    validator: CredentialValidator,
}

impl PlayerSession {
    pub fn new(
        config: &Config,
        service: Arc<dyn AuthorizationService>,
        location: Arc<dyn Location>,
        transport: Arc<dyn MediaTransport>,
        credential: Credential,
        username: Option<String>,
    ) -> Self {
        let controller = Arc::new(PlaybackController::new(transport.clone()));
        let validator = CredentialValidator::new(
            service,
            RequestContext::from_config(config),
            config.validation.interval(),
            controller.clone(),
        );

        Self {
            session: SessionContext::new(username),
            credential,
            origin: None,
            origin_provider: OriginProvider::new(location, &config.origin),
            media: config.media.clone(),
            transport,
            controller,
            validator,
        }
    }

    pub fn id(&self) -> SessionId {
        self.session.id()
    }

    /// Resolve the origin, load the media source and start validating.
    pub fn mount(&mut self) {
        let origin = self
            .origin_provider
            .resolve(&self.credential, self.session.username());
        tracing::info!(
            session_id = %self.session.id(),
            origin = %origin,
            mode = %self.session.mode(),
            "Mounting player session"
        );
        self.origin = Some(origin);
        self.bind_source();
        self.restart_validation();
    }

    /// Replace the credential; reloads the source and restarts validation.
    pub fn set_credential(&mut self, credential: Credential) {
        if credential == self.credential {
            return;
        }
        tracing::info!(session_id = %self.session.id(), "Credential changed");
        self.credential = credential;
        self.bind_source();
        self.restart_validation();
    }

    /// Replace the username. Only the displayed mode follows.
    pub fn set_username(&mut self, username: Option<String>) {
        self.session.set_username(username);
    }

    /// Re-read the origin after the location changed externally.
    ///
    /// Validation restarts only when the resolved address differs. Returns
    /// whether it did.
    pub fn location_changed(&mut self) -> bool {
        let origin = self
            .origin_provider
            .resolve(&self.credential, self.session.username());

        if self.origin.as_ref().map(|o| &o.address) == Some(&origin.address) {
            return false;
        }

        tracing::info!(
            session_id = %self.session.id(),
            origin = %origin,
            "Origin changed"
        );
        self.origin = Some(origin);
        self.restart_validation();
        true
    }

    /// Stop validating. In-flight responses are discarded.
    pub fn teardown(&mut self) {
        self.validator.stop();
        tracing::info!(session_id = %self.session.id(), "Player session torn down");
    }

    pub fn play_pause(&self) -> PlaybackStatus {
        self.controller.toggle_play()
    }

    pub fn seek(&self, position: f64) -> Option<f64> {
        self.controller.seek(position)
    }

    pub fn toggle_mute(&self) -> bool {
        self.controller.toggle_mute()
    }

    pub fn handle_transport_event(&self, event: TransportEvent) {
        self.controller.on_transport_event(event);
    }

    pub fn verdict(&self) -> Verdict {
        self.validator.verdict()
    }

    pub fn subscribe(&self) -> watch::Receiver<Verdict> {
        self.validator.subscribe()
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn validator(&self) -> &CredentialValidator {
        &self.validator
    }

    pub fn origin(&self) -> Option<&NetworkOrigin> {
        self.origin.as_ref()
    }

    pub fn view(&self) -> PlayerView {
        PlayerView::build(
            self.origin.as_ref().map(|o| o.address.as_str()),
            self.session.mode(),
            self.session.username(),
            self.validator.verdict(),
            self.controller.state(),
        )
    }

    fn bind_source(&self) {
        let source = media_source_url(&self.media, &self.credential);
        self.transport.set_source(source.as_deref());
        self.controller.on_source_changed();
    }

    fn restart_validation(&self) {
        self.validator
            .start(self.credential.clone(), self.origin.clone());
    }
}
