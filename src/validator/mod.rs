//! Recurring credential validation.
//!
//! [`CredentialValidator::start`] begins a cycle that validates the
//! credential immediately and then on a fixed cadence until it is stopped.
//! Each cycle is tagged with a [`Generation`]. Starting or stopping advances
//! the active generation, and a response is applied only if the generation it
//! was issued under is still active when it arrives. Responses from stopped
//! cycles are dropped regardless of arrival order.
//!
//! Applying a response publishes the verdict to the observable slot and
//! hands it to the [`AccessGate`] under the same lock that guards the active
//! generation, so observers never see a verdict without its playback effect.

use crate::auth::{AuthorizationService, RequestContext, ValidationRequest};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use streamgate_common::{Credential, Error, Generation, NetworkOrigin, Verdict};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Receiver of every applied verdict.
///
/// Called with the generation lock held; implementations must not call back
/// into the validator.
pub trait AccessGate: Send + Sync {
    fn apply_verdict(&self, verdict: &Verdict);
}

/// Validate a single request and map the outcome to a verdict.
///
/// Service answers are carried over verbatim; failures to obtain an answer
/// are fail-closed.
pub async fn evaluate(service: &dyn AuthorizationService, request: &ValidationRequest) -> Verdict {
    match service.validate(request).await {
        Ok(result) if result.is_valid => result.into_verdict(),
        Ok(result) => {
            tracing::debug!(
                origin = %request.request_ip,
                message = %result.message,
                "Credential rejected by authorization service"
            );
            Error::rejected(result.message).verdict()
        }
        Err(e) => {
            tracing::warn!(error = %e, origin = %request.request_ip, "Token validation failed");
            e.verdict()
        }
    }
}

pub struct CredentialValidator {
    service: Arc<dyn AuthorizationService>,
    context: RequestContext,
    interval: Duration,
    shared: Arc<Shared>,
    cycle: Mutex<Option<Cycle>>,
}

struct Shared {
    active: Mutex<Generation>,
    verdict_tx: watch::Sender<Verdict>,
    gate: Arc<dyn AccessGate>,
}

struct Cycle {
    generation: Generation,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl CredentialValidator {
    pub fn new(
        service: Arc<dyn AuthorizationService>,
        context: RequestContext,
        interval: Duration,
        gate: Arc<dyn AccessGate>,
    ) -> Self {
        let (verdict_tx, _) = watch::channel(Verdict::pending());
        Self {
            service,
            context,
            interval,
            shared: Arc::new(Shared {
                active: Mutex::new(Generation::INITIAL),
                verdict_tx,
                gate,
            }),
            cycle: Mutex::new(None),
        }
    }

    /// Observe published verdicts.
    pub fn subscribe(&self) -> watch::Receiver<Verdict> {
        self.shared.verdict_tx.subscribe()
    }

    /// The latest published verdict.
    pub fn verdict(&self) -> Verdict {
        self.shared.verdict_tx.borrow().clone()
    }

    pub fn active_generation(&self) -> Generation {
        *self.shared.active.lock()
    }

    /// Whether a polling cycle is currently scheduled.
    pub fn is_running(&self) -> bool {
        self.cycle.lock().is_some()
    }

    /// Stop the current cycle, if any, and begin validating `credential`
    /// from `origin`.
    ///
    /// An empty credential publishes the missing-credential verdict without
    /// any request. An unresolved origin defers validation: nothing is sent
    /// and the verdict is left as is until `start` is called again with one.
    /// Without a Tokio runtime to schedule on, access is denied with the
    /// client-side error verdict.
    pub fn start(&self, credential: Credential, origin: Option<NetworkOrigin>) -> Generation {
        let mut cycle = self.cycle.lock();
        let generation = self.stop_locked(&mut cycle);

        if credential.is_empty() {
            tracing::info!(%generation, "No credential supplied; access denied");
            self.shared
                .apply(generation, Error::MissingCredential.verdict());
            return generation;
        }

        let Some(origin) = origin else {
            tracing::debug!(%generation, "Origin not resolved; deferring validation");
            return generation;
        };

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(%generation, error = %e, "No async runtime; cannot start validation");
                self.shared
                    .apply(generation, Error::internal(e.to_string()).verdict());
                return generation;
            }
        };

        tracing::info!(
            %generation,
            origin = %origin,
            interval_ms = self.interval.as_millis() as u64,
            "Starting validation cycle"
        );

        let cancel = CancellationToken::new();
        let task = handle.spawn(run_cycle(
            self.shared.clone(),
            self.service.clone(),
            ValidationRequest::new(&credential, &origin, &self.context),
            self.interval,
            generation,
            cancel.clone(),
        ));

        *cycle = Some(Cycle {
            generation,
            cancel,
            task,
        });

        generation
    }

    /// Cancel the current cycle. Responses still in flight are discarded.
    ///
    /// Returns the generation that is active afterwards.
    pub fn stop(&self) -> Generation {
        let mut cycle = self.cycle.lock();
        self.stop_locked(&mut cycle)
    }

    fn stop_locked(&self, cycle: &mut Option<Cycle>) -> Generation {
        if let Some(current) = cycle.take() {
            current.cancel.cancel();
            current.task.abort();
            tracing::info!(generation = %current.generation, "Stopped validation cycle");
        }

        let mut active = self.shared.active.lock();
        *active = active.next();
        *active
    }
}

impl Drop for CredentialValidator {
    fn drop(&mut self) {
        if let Some(current) = self.cycle.get_mut().take() {
            current.cancel.cancel();
            current.task.abort();
        }
        let mut active = self.shared.active.lock();
        *active = active.next();
    }
}

impl Shared {
    /// Publish `verdict` if `generation` is still active.
    fn apply(&self, generation: Generation, verdict: Verdict) -> bool {
        let active = self.active.lock();
        if *active != generation {
            tracing::debug!(
                %generation,
                active = %*active,
                "Discarding response from superseded validation cycle"
            );
            return false;
        }

        let previous = self.verdict_tx.send_replace(verdict.clone());
        if !previous.same_decision(&verdict) {
            tracing::info!(
                %generation,
                valid = verdict.is_valid,
                message = %verdict.message,
                "Access verdict changed"
            );
        }
        self.gate.apply_verdict(&verdict);
        true
    }
}

/// Timer loop of one cycle. Requests run as their own tasks so that a slow
/// service never delays the next tick. They belong to the cycle and are
/// aborted with it.
async fn run_cycle(
    shared: Arc<Shared>,
    service: Arc<dyn AuthorizationService>,
    request: ValidationRequest,
    interval: Duration,
    generation: Generation,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut requests = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            Some(_) = requests.join_next(), if !requests.is_empty() => {}
            _ = ticker.tick() => {
                requests.spawn(check_once(
                    shared.clone(),
                    service.clone(),
                    request.clone(),
                    generation,
                ));
            }
        }
    }

    requests.abort_all();
}

async fn check_once(
    shared: Arc<Shared>,
    service: Arc<dyn AuthorizationService>,
    request: ValidationRequest,
    generation: Generation,
) {
    tracing::trace!(%generation, "Sending validation request");
    let verdict = evaluate(service.as_ref(), &request).await;
    shared.apply(generation, verdict);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ValidationResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use streamgate_common::Result;

    struct CountingService {
        calls: AtomicUsize,
        result: ValidationResult,
    }

    #[async_trait::async_trait]
    impl AuthorizationService for CountingService {
        async fn validate(&self, _request: &ValidationRequest) -> Result<ValidationResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result.clone())
        }
    }

    #[derive(Default)]
    struct RecordingGate {
        verdicts: Mutex<Vec<Verdict>>,
    }

    impl AccessGate for RecordingGate {
        fn apply_verdict(&self, verdict: &Verdict) {
            self.verdicts.lock().push(verdict.clone());
        }
    }

    fn validator(result: ValidationResult) -> (CredentialValidator, Arc<CountingService>, Arc<RecordingGate>) {
        let service = Arc::new(CountingService {
            calls: AtomicUsize::new(0),
            result,
        });
        let gate = Arc::new(RecordingGate::default());
        let validator = CredentialValidator::new(
            service.clone(),
            RequestContext::default(),
            Duration::from_millis(2000),
            gate.clone(),
        );
        (validator, service, gate)
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_credential_publishes_without_request() {
        let (validator, service, gate) = validator(ValidationResult::valid("ok"));

        validator.start(Credential::default(), Some(NetworkOrigin::defaulted("203.113.131.5")));
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert!(!validator.is_running());
        let verdict = validator.verdict();
        assert!(!verdict.is_valid);
        assert_eq!(verdict.message, "No token provided");
        assert_eq!(gate.verdicts.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_evaluate_surfaces_rejection_verbatim() {
        let (_, service, _) = validator(ValidationResult::invalid("Token expired"));
        let request = ValidationRequest::new(
            &Credential::from("abc123"),
            &NetworkOrigin::defaulted("203.113.131.5"),
            &RequestContext::default(),
        );

        let verdict = evaluate(service.as_ref(), &request).await;
        assert!(!verdict.is_valid);
        assert_eq!(verdict.message, "Token expired");
        assert!(verdict.is_settled());
    }

    #[test]
    fn test_start_outside_runtime_fails_closed() {
        let (validator, service, gate) = validator(ValidationResult::valid("ok"));

        validator.start(Credential::from("abc123"), Some(NetworkOrigin::defaulted("203.113.131.5")));

        assert!(!validator.is_running());
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        let verdict = validator.verdict();
        assert!(!verdict.is_valid);
        assert_eq!(verdict.message, streamgate_common::CLIENT_ERROR_MESSAGE);
        assert_eq!(gate.verdicts.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresolved_origin_defers() {
        let (validator, service, gate) = validator(ValidationResult::valid("ok"));

        validator.start(Credential::from("abc123"), None);
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert!(!validator.verdict().is_settled());
        assert!(gate.verdicts.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_and_stop_advance_generation() {
        let (validator, _, _) = validator(ValidationResult::valid("ok"));
        assert_eq!(validator.active_generation(), Generation::INITIAL);

        let first = validator.start(Credential::from("a"), Some(NetworkOrigin::defaulted("x")));
        assert!(validator.is_running());
        let stopped = validator.stop();
        assert!(stopped > first);
        assert!(!validator.is_running());

        let second = validator.start(Credential::from("a"), Some(NetworkOrigin::defaulted("x")));
        assert!(second > stopped);
        assert_eq!(validator.active_generation(), second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_is_discarded() {
        let (validator, _, gate) = validator(ValidationResult::valid("ok"));
        let stale = validator.start(Credential::from("a"), None);
        validator.stop();

        assert!(!validator.shared.apply(stale, Verdict::valid("late")));
        assert!(gate.verdicts.lock().is_empty());

        let active = validator.active_generation();
        assert!(validator.shared.apply(active, Verdict::invalid("fresh")));
        assert_eq!(validator.verdict().message, "fresh");
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_changes() {
        let (validator, _, _) = validator(ValidationResult::invalid("expired"));
        let mut rx = validator.subscribe();

        validator.start(Credential::from("abc123"), Some(NetworkOrigin::defaulted("203.113.131.5")));
        rx.changed().await.unwrap();

        let verdict = rx.borrow().clone();
        assert!(!verdict.is_valid);
        assert_eq!(verdict.message, "expired");
    }
}
