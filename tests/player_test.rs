//! End-to-end tests for the composed player session.

mod common;

use common::{settle, FixedService, TestPlayer};
use streamgate::auth::ValidationResult;
use streamgate::origin::Location;
use streamgate::playback::MediaTransport;
use streamgate_common::{Credential, OriginProvenance, PlaybackStatus, UserMode};

const PLAYER_URL: &str = "http://localhost/player";

// ---------------------------------------------------------------------------
// Mounting
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn mount_with_default_origin_grants_playback() {
    let service = FixedService::new(ValidationResult::valid("ok"));
    let mut t = TestPlayer::new(service.clone(), PLAYER_URL, "abc123", None);

    t.player.mount();
    settle().await;

    let params = t.location.parameters();
    assert_eq!(params.get("ip"), Some("203.113.131.5"));
    assert_eq!(params.get("token"), Some("abc123"));
    assert_eq!(params.get("username"), None);
    assert_eq!(t.location.replacements(), 1);

    let request = service.last_request().unwrap();
    assert_eq!(request.request_ip, "203.113.131.5");
    assert_eq!(request.token, "abc123");
    assert_eq!(
        t.player.origin().unwrap().provenance,
        OriginProvenance::Defaulted
    );

    let view = t.player.view();
    assert!(view.controls_enabled);
    assert!(view.denied_overlay.is_none());
    assert_eq!(view.origin_banner, "Validating with IP: 203.113.131.5");
    assert_eq!(view.mode, UserMode::Pirate);

    assert_eq!(t.player.play_pause(), PlaybackStatus::Playing);
}

#[tokio::test(start_paused = true)]
async fn mount_without_credential_denies_immediately() {
    let service = FixedService::new(ValidationResult::valid("ok"));
    let mut t = TestPlayer::new(service.clone(), PLAYER_URL, "", Some("alice"));

    t.player.mount();
    settle().await;

    assert_eq!(service.calls(), 0);
    let view = t.player.view();
    assert!(!view.verdict.is_valid);
    assert_eq!(view.denied_overlay.as_deref(), Some("No token provided"));
    assert_eq!(view.playback.status, PlaybackStatus::Blocked);
    assert_eq!(view.mode_label, "Legitimate Mode");
    assert!(t.transport.source().is_none());

    assert_eq!(t.player.play_pause(), PlaybackStatus::Blocked);
}

#[test]
fn mount_outside_runtime_fails_closed() {
    let service = FixedService::new(ValidationResult::valid("ok"));
    let mut t = TestPlayer::new(service.clone(), PLAYER_URL, "abc123", None);

    t.player.mount();

    assert_eq!(service.calls(), 0);
    assert!(!t.player.validator().is_running());
    let view = t.player.view();
    assert_eq!(view.playback.status, PlaybackStatus::Blocked);
    assert_eq!(
        view.denied_overlay.as_deref(),
        Some("Client-side error during token validation.")
    );
}

#[tokio::test(start_paused = true)]
async fn caller_provided_origin_is_not_rewritten() {
    let service = FixedService::new(ValidationResult::valid("ok"));
    let mut t = TestPlayer::new(
        service.clone(),
        "http://localhost/player?ip=198.51.100.7&token=abc123",
        "abc123",
        None,
    );

    t.player.mount();
    settle().await;

    assert_eq!(t.location.replacements(), 0);
    assert_eq!(service.last_request().unwrap().request_ip, "198.51.100.7");
    assert_eq!(
        t.player.origin().unwrap().provenance,
        OriginProvenance::CallerProvided
    );
}

#[tokio::test(start_paused = true)]
async fn origin_resolution_is_idempotent() {
    let service = FixedService::new(ValidationResult::valid("ok"));
    let mut t = TestPlayer::new(service, PLAYER_URL, "abc123", Some("alice"));

    t.player.mount();
    let href = t.location.href();
    assert!(!t.player.location_changed());
    assert!(!t.player.location_changed());

    assert_eq!(t.location.href(), href);
    assert_eq!(t.location.replacements(), 1);
    assert_eq!(t.location.parameters().get("username"), Some("alice"));
}

#[tokio::test(start_paused = true)]
async fn media_source_carries_credential() {
    let service = FixedService::new(ValidationResult::valid("ok"));
    let mut t = TestPlayer::new(service, PLAYER_URL, "abc123", None);
    t.player.mount();

    let source = t.transport.source().unwrap();
    assert!(source.ends_with("/BigBuckBunny.mp4?token=abc123"));
}

// ---------------------------------------------------------------------------
// Revocation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn revoked_credential_blocks_active_playback() {
    let service = FixedService::new(ValidationResult::valid("ok"));
    let mut t = TestPlayer::new(service.clone(), PLAYER_URL, "abc123", Some("alice"));
    t.player.mount();
    settle().await;

    t.advance_media(0.0);
    assert_eq!(t.player.play_pause(), PlaybackStatus::Playing);
    t.advance_media(5.0);
    assert_eq!(t.player.controller().state().position, 5.0);

    service.set(ValidationResult::invalid("expired"));
    tokio::time::sleep(std::time::Duration::from_millis(2000)).await;

    let view = t.player.view();
    assert_eq!(view.playback.status, PlaybackStatus::Blocked);
    assert_eq!(view.denied_overlay.as_deref(), Some("expired"));
    assert!(!view.controls_enabled);
    assert!(t.transport.is_paused());

    // Presses are ignored until the verdict turns valid again.
    assert_eq!(t.player.play_pause(), PlaybackStatus::Blocked);
    assert_eq!(t.player.seek(30.0), None);
    assert!(t.transport.is_paused());

    // Mute stays available.
    assert!(t.player.toggle_mute());

    service.set(ValidationResult::valid("ok"));
    tokio::time::sleep(std::time::Duration::from_millis(2000)).await;

    assert_eq!(t.player.controller().status(), PlaybackStatus::Paused);
    assert_eq!(t.player.play_pause(), PlaybackStatus::Playing);
}

#[tokio::test(start_paused = true)]
async fn unreachable_service_blocks_with_client_error() {
    let service = FixedService::new(ValidationResult::valid("ok"));
    service.fail_with("connection refused");
    let mut t = TestPlayer::new(service, PLAYER_URL, "abc123", None);

    t.player.mount();
    settle().await;

    let view = t.player.view();
    assert_eq!(
        view.denied_overlay.as_deref(),
        Some("Client-side error during token validation.")
    );
    assert_eq!(view.playback.status, PlaybackStatus::Blocked);
}

// ---------------------------------------------------------------------------
// Restarts
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn credential_change_restarts_validation() {
    let service = FixedService::new(ValidationResult::valid("ok"));
    let mut t = TestPlayer::new(service.clone(), PLAYER_URL, "abc123", None);
    t.player.mount();
    settle().await;
    let generation = t.player.validator().active_generation();

    t.player.set_credential(Credential::from("abc123"));
    assert_eq!(t.player.validator().active_generation(), generation);

    t.player.set_credential(Credential::from("def456"));
    settle().await;

    assert!(t.player.validator().active_generation() > generation);
    assert_eq!(service.last_request().unwrap().token, "def456");
    assert!(t.transport.source().unwrap().ends_with("token=def456"));
}

#[tokio::test(start_paused = true)]
async fn clearing_credential_blocks_and_unloads() {
    let service = FixedService::new(ValidationResult::valid("ok"));
    let mut t = TestPlayer::new(service.clone(), PLAYER_URL, "abc123", None);
    t.player.mount();
    settle().await;
    let calls = service.calls();

    t.player.set_credential(Credential::default());
    tokio::time::sleep(std::time::Duration::from_millis(5000)).await;

    assert_eq!(service.calls(), calls);
    assert_eq!(t.player.verdict().message, "No token provided");
    assert!(t.transport.source().is_none());
}

#[tokio::test(start_paused = true)]
async fn origin_change_restarts_validation() {
    let service = FixedService::new(ValidationResult::valid("ok"));
    let mut t = TestPlayer::new(service.clone(), PLAYER_URL, "abc123", None);
    t.player.mount();
    settle().await;

    t.location.navigate_param("ip", "192.0.2.44");
    assert!(t.player.location_changed());
    settle().await;

    assert_eq!(service.last_request().unwrap().request_ip, "192.0.2.44");
    assert_eq!(
        t.player.view().origin_banner,
        "Validating with IP: 192.0.2.44"
    );
}

#[tokio::test(start_paused = true)]
async fn username_change_only_affects_mode() {
    let service = FixedService::new(ValidationResult::valid("ok"));
    let mut t = TestPlayer::new(service.clone(), PLAYER_URL, "abc123", None);
    t.player.mount();
    settle().await;
    let generation = t.player.validator().active_generation();

    t.player.set_username(Some("alice".into()));
    assert_eq!(t.player.view().mode_label, "Legitimate Mode");
    assert_eq!(t.player.validator().active_generation(), generation);
}

#[tokio::test(start_paused = true)]
async fn teardown_stops_polling() {
    let service = FixedService::new(ValidationResult::valid("ok"));
    let mut t = TestPlayer::new(service.clone(), PLAYER_URL, "abc123", None);
    t.player.mount();
    settle().await;

    t.player.teardown();
    let calls = service.calls();
    tokio::time::sleep(std::time::Duration::from_millis(10_000)).await;

    assert_eq!(service.calls(), calls);
    assert!(!t.player.validator().is_running());
}
