use std::sync::Arc;

use linkcard_capture_engine::backend::{DeviceEvent, SyntheticDevices};
use linkcard_capture_engine::{CaptureMode, CaptureSession, SessionState};
use linkcard_card_model::{ArtifactRef, CardDefaults, CardType, DefaultsStore, ValidationError};
use linkcard_common::config::CaptureSettings;
use linkcard_composer::{
    CardComposer, CardRepository, ComposeError, IdentityProvider, LocalCardRepository,
    StaticIdentity,
};

fn session(devices: &Arc<SyntheticDevices>) -> CaptureSession {
    CaptureSession::new(devices.clone(), &CaptureSettings::default())
}

#[test]
fn quick_compose_from_seed_defaults() {
    let defaults = CardDefaults::default();
    assert_eq!(defaults.credit_cost, 10);
    assert_eq!(defaults.tags, "premium, vip");
    assert_eq!(defaults.expiry_minutes, 0);

    let card = CardComposer::new()
        .compose_from_defaults(
            &defaults,
            None,
            &ArtifactRef::inline("image/png", vec![0x89, b'P', b'N', b'G']),
            Some("image/png"),
            None,
        )
        .expect("quick compose succeeds with media");

    assert_eq!(card.card_type, CardType::Image);
    assert_eq!(card.tags, vec!["premium", "vip"]);
    assert_eq!(card.expiry_seconds, 0);
    assert_eq!(card.credit_cost, 10);
    assert_eq!(card.title, "Conteúdo Exclusivo");
    assert!(card.is_blur);
}

#[test]
fn quick_compose_type_overrides_prior_selection() {
    let mut composer = CardComposer::new();
    composer.set_type(CardType::Audio);

    let card = composer
        .compose_from_defaults(
            &CardDefaults::default(),
            None,
            &ArtifactRef::url("https://cdn.example.com/clip.webm"),
            Some("video/webm"),
            None,
        )
        .unwrap();
    assert_eq!(card.card_type, CardType::Video);
}

#[test]
fn image_card_without_media_emits_nothing() {
    let devices = Arc::new(SyntheticDevices::new());
    let composer = CardComposer::new();

    let result = composer.compose(&session(&devices));
    assert!(matches!(
        result,
        Err(ComposeError::Validation(ValidationError::MissingMedia {
            card_type: CardType::Image
        }))
    ));
}

#[tokio::test]
async fn recorded_video_is_composed_stored_and_edited() {
    let dir = tempfile::tempdir().unwrap();
    let repo = LocalCardRepository::new(dir.path().join("cards.json"));
    let identity = StaticIdentity::new(Some("creator-42".into()));

    let devices = Arc::new(SyntheticDevices::new());
    let mut session = session(&devices);
    let mut composer = CardComposer::new().with_creator(identity.current_user());
    composer.set_type(CardType::Video);
    composer.form_mut().title = "Bastidores".into();
    composer.form_mut().expiry_minutes = 5;

    session.start(CaptureMode::Video).await.unwrap();
    session.record().unwrap();
    assert!(matches!(
        composer.compose(&session),
        Err(ComposeError::CaptureInProgress {
            state: SessionState::Recording
        })
    ));
    session.stop().await.unwrap();
    assert_eq!(devices.active_tracks(), 0);

    let card = composer.compose(&session).unwrap();
    assert_eq!(card.expiry_seconds, 300);
    assert_eq!(card.thumbnail.mime(), Some("image/jpeg"));
    repo.submit(card.clone()).await.unwrap();

    let stored = repo.list("creator-42").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], card);

    let mut editor = CardComposer::new().with_creator(identity.current_user());
    let events_before = devices.events().len();
    editor.edit(&stored[0], &mut session);
    assert_eq!(editor.form().expiry_minutes, 5);
    assert_eq!(devices.events().len(), events_before);

    editor.form_mut().credit_cost = 25;
    let edited = editor.compose(&session).unwrap();
    assert_eq!(edited.id, card.id);
    assert_eq!(edited.created_at, card.created_at);
    repo.submit(edited).await.unwrap();

    let stored = repo.list("creator-42").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].credit_cost, 25);
    assert_eq!(stored[0].media_url, card.media_url);
}

#[tokio::test]
async fn switching_capture_releases_previous_device_first() {
    let devices = Arc::new(SyntheticDevices::new());
    let mut session = session(&devices);

    session.start(CaptureMode::Audio).await.unwrap();
    session.record().unwrap();
    session.start(CaptureMode::Video).await.unwrap();

    let events = devices.events();
    let released = events
        .iter()
        .position(|e| matches!(e, DeviceEvent::Released { .. }))
        .unwrap();
    let requests: Vec<_> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, DeviceEvent::Requested { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(requests.len(), 2);
    assert!(requests[0] < released && released < requests[1]);

    session.reset();
    assert_eq!(devices.active_tracks(), 0);
}

#[test]
fn saved_defaults_drive_quick_compose() {
    let dir = tempfile::tempdir().unwrap();
    let store = DefaultsStore::new(dir.path(), "linkcard_defaults");

    let defaults = CardDefaults {
        credit_cost: 50,
        expiry_minutes: 2,
        tags: " a ,b,, ".into(),
        ..CardDefaults::default()
    };
    let thumb = ArtifactRef::inline("image/jpeg", vec![1, 2, 3]);
    store.save(&defaults, Some(&thumb)).unwrap();

    let loaded = store.load();
    let card = CardComposer::new()
        .compose_from_defaults(
            &loaded,
            store.load_thumbnail().as_ref(),
            &ArtifactRef::inline("audio/webm", vec![9; 16]),
            None,
            Some("creator-1"),
        )
        .unwrap();

    assert_eq!(card.card_type, CardType::Audio);
    assert_eq!(card.credit_cost, 50);
    assert_eq!(card.expiry_seconds, 120);
    assert_eq!(card.tags, vec!["a", "b"]);
    assert_eq!(card.thumbnail, thumb);
}
