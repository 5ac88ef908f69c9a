//! Shared test harness for integration tests.
//!
//! Provides [`ScriptedService`], an authorization service whose calls are
//! handed to the test and answered explicitly, and [`FixedService`], which
//! answers every call immediately with a configurable result.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use streamgate::auth::{AuthorizationService, ValidationRequest, ValidationResult};
use streamgate::config::Config;
use streamgate::origin::MemoryLocation;
use streamgate::playback::SimulatedTransport;
use streamgate::player::PlayerSession;
use streamgate_common::{Credential, Error, Result};
use tokio::sync::{mpsc, oneshot};

/// One outstanding call to a [`ScriptedService`].
pub struct PendingCall {
    pub request: ValidationRequest,
    respond: oneshot::Sender<Result<ValidationResult>>,
}

impl PendingCall {
    /// Whether the validator gave up on this call.
    pub fn is_abandoned(&self) -> bool {
        self.respond.is_closed()
    }

    pub fn respond(self, result: Result<ValidationResult>) {
        let _ = self.respond.send(result);
    }

    pub fn valid(self, message: &str) {
        self.respond(Ok(ValidationResult::valid(message)));
    }

    pub fn invalid(self, message: &str) {
        self.respond(Ok(ValidationResult::invalid(message)));
    }

    pub fn fail(self, message: &str) {
        self.respond(Err(Error::transport(message)));
    }
}

/// Authorization service that parks every call until the test answers it.
pub struct ScriptedService {
    calls: mpsc::UnboundedSender<PendingCall>,
    count: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<PendingCall>) {
        let (calls, rx) = mpsc::unbounded_channel();
        let service = Arc::new(Self {
            calls,
            count: AtomicUsize::new(0),
        });
        (service, rx)
    }

    pub fn calls(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AuthorizationService for ScriptedService {
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidationResult> {
        self.count.fetch_add(1, Ordering::SeqCst);
        let (respond, rx) = oneshot::channel();
        self.calls
            .send(PendingCall {
                request: request.clone(),
                respond,
            })
            .map_err(|_| Error::transport("script closed"))?;
        rx.await
            .unwrap_or_else(|_| Err(Error::transport("call abandoned")))
    }
}

/// Authorization service that answers immediately.
pub struct FixedService {
    result: Mutex<Result<ValidationResult>>,
    requests: Mutex<Vec<ValidationRequest>>,
}

impl FixedService {
    pub fn new(result: ValidationResult) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(Ok(result)),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn set(&self, result: ValidationResult) {
        *self.result.lock() = Ok(result);
    }

    pub fn fail_with(&self, message: &str) {
        *self.result.lock() = Err(Error::transport(message));
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<ValidationRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait::async_trait]
impl AuthorizationService for FixedService {
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidationResult> {
        self.requests.lock().push(request.clone());
        match &*self.result.lock() {
            Ok(result) => Ok(result.clone()),
            Err(e) => Err(Error::transport(e.to_string())),
        }
    }
}

/// A player session plus handles on its fakes.
pub struct TestPlayer {
    pub player: PlayerSession,
    pub location: Arc<MemoryLocation>,
    pub transport: Arc<SimulatedTransport>,
}

impl TestPlayer {
    pub fn new(
        service: Arc<dyn AuthorizationService>,
        href: &str,
        token: &str,
        username: Option<&str>,
    ) -> Self {
        let location = Arc::new(MemoryLocation::parse(href).expect("valid test location"));
        let transport = Arc::new(SimulatedTransport::new(120.0));
        let player = PlayerSession::new(
            &Config::default(),
            service,
            location.clone(),
            transport.clone(),
            Credential::new(token),
            username.map(str::to_string),
        );
        Self {
            player,
            location,
            transport,
        }
    }

    /// Let the transport report metadata and progress for `elapsed` seconds.
    pub fn advance_media(&self, elapsed: f64) {
        for event in self.transport.tick(elapsed) {
            self.player.handle_transport_event(event);
        }
    }
}

/// Let spawned tasks run to completion without crossing a polling tick.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
