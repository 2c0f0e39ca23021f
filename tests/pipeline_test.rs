//! Integration tests for the drop-capture pipeline
//!
//! These tests validate the full capture cycle across the engine:
//! - calibration -> detection -> one-shot location -> persistence
//! - pending-text retention on location and store failures
//! - periodic location updates refreshing the nearby set
//!
//! Platform collaborators are replaced by the fixtures in `dropnote::testing`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dropnote::config::AppConfig;
use dropnote::engine::{CaptureState, NoteEngine};
use dropnote::error::LocationError;
use dropnote::geo::GeoPoint;
use dropnote::location::LocationSource;
use dropnote::motion::{Motion, Sample};
use dropnote::notes::{Note, NoteStore};
use dropnote::testing::{FixtureLocationSource, MemoryNoteStore};

fn create_engine(
    store: Arc<MemoryNoteStore>,
    location: Arc<FixtureLocationSource>,
) -> NoteEngine {
    NoteEngine::new(AppConfig::default(), store, location)
}

/// Poll until `condition` holds or the timeout elapses.
fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Feed the canonical raw drop trace: calibration tick, five steady ticks,
/// catch spike, rebound. Returns the classification of each tick.
fn feed_canonical_drop(engine: &NoteEngine) -> Vec<Motion> {
    let mut results = Vec::new();
    for _ in 0..6 {
        results.push(engine.handle_sample(Sample::new(0.0, 0.0, 9.8)));
    }
    results.push(engine.handle_sample(Sample::new(0.0, -7.0, 25.8)));
    results.push(engine.handle_sample(Sample::new(0.0, -7.0, -5.2)));
    results
}

#[test]
fn test_end_to_end_drop_capture() {
    let store = Arc::new(MemoryNoteStore::new());
    let location = Arc::new(FixtureLocationSource::manual());
    let engine = create_engine(store.clone(), location.clone());

    engine.set_pending_text("hello");
    let mut motion_rx = engine.subscribe_motion().expect("motion channel");

    let results = feed_canonical_drop(&engine);

    // Steady ticks and the catch spike itself classify as None; only the
    // rebound completes the window.
    assert!(results[..7].iter().all(|m| *m == Motion::None));
    assert_eq!(results[7], Motion::Drop);

    // The drop with non-empty pending text fires exactly one one-shot request
    assert_eq!(engine.capture_state(), CaptureState::LocationRequested);
    assert_eq!(location.pending_requests(), 1);

    // The calibrated rebound sample rides along on the motion event
    let event = motion_rx.try_recv().expect("drop event");
    assert_eq!(event.motion, Motion::Drop);
    assert_eq!(event.sample, Sample::new(0.0, -7.0, -15.0));

    // Resolve the fix; the worker persists the note and closes the cycle
    let point = GeoPoint::new(48.137, 11.575);
    assert_eq!(location.resolve(point), 1);

    assert!(
        wait_until(Duration::from_secs(2), || store.len() == 1),
        "note was not persisted"
    );
    let notes = store.load_all().unwrap();
    assert_eq!(notes[0], Note::new("hello".to_string(), 48.137, 11.575));

    assert!(wait_until(Duration::from_secs(2), || {
        engine.capture_state() == CaptureState::Idle
    }));
    assert_eq!(engine.pending_text(), "");

    // The resolved point doubles as the reference for a nearby refresh
    let snapshot = engine.nearby_snapshot().expect("nearby snapshot");
    assert_eq!(snapshot.count, 1);
    assert_eq!(snapshot.reference, point);
}

#[test]
fn test_drop_without_pending_text_requests_nothing() {
    let store = Arc::new(MemoryNoteStore::new());
    let location = Arc::new(FixtureLocationSource::manual());
    let engine = create_engine(store.clone(), location.clone());

    let results = feed_canonical_drop(&engine);
    assert_eq!(*results.last().unwrap(), Motion::Drop);

    assert_eq!(location.pending_requests(), 0);
    assert_eq!(engine.capture_state(), CaptureState::Idle);
    assert!(store.is_empty());
}

#[test]
fn test_location_failure_retains_pending_text() {
    let store = Arc::new(MemoryNoteStore::new());
    let location = Arc::new(FixtureLocationSource::manual());
    let engine = create_engine(store.clone(), location.clone());

    engine.set_pending_text("hello");
    feed_canonical_drop(&engine);
    assert_eq!(location.pending_requests(), 1);

    // Provider fails: the reply channel closes without a fix
    assert_eq!(location.drop_pending(), 1);
    std::thread::sleep(Duration::from_millis(100));

    assert!(store.is_empty());
    assert_eq!(engine.pending_text(), "hello");
    // No transition out of LocationRequested; the next gesture retries
    assert_eq!(engine.capture_state(), CaptureState::LocationRequested);
}

#[test]
fn test_append_failure_retains_pending_text() {
    let store = Arc::new(MemoryNoteStore::new());
    store.set_fail_append(true);
    let location = Arc::new(FixtureLocationSource::manual());
    let engine = create_engine(store.clone(), location.clone());

    engine.set_pending_text("hello");
    feed_canonical_drop(&engine);
    location.resolve(GeoPoint::new(1.0, 2.0));

    assert!(wait_until(Duration::from_secs(2), || {
        engine.capture_state() == CaptureState::Idle
    }));

    // The note was not persisted, so the text survives for a retry
    assert!(store.is_empty());
    assert_eq!(engine.pending_text(), "hello");
}

#[test]
fn test_periodic_updates_refresh_nearby_set() {
    let store = Arc::new(MemoryNoteStore::new());
    store
        .append(&Note::new("same-lat".to_string(), 0.0, 10.0))
        .unwrap();
    store
        .append(&Note::new("far".to_string(), 0.0005, 0.0005))
        .unwrap();
    store
        .append(&Note::new("boundary".to_string(), 0.0004, 1.0))
        .unwrap();

    let location = Arc::new(FixtureLocationSource::manual());
    let engine = create_engine(store.clone(), location.clone());
    let mut nearby_rx = engine.subscribe_nearby().expect("nearby channel");

    engine.start().expect("start updates");
    assert!(location.push_update(GeoPoint::new(0.0, 0.0)));

    assert!(wait_until(Duration::from_secs(2), || {
        engine.nearby_snapshot().is_some()
    }));

    // OR-semantics: single-axis matches stay in, input order is preserved
    let snapshot = engine.nearby_snapshot().unwrap();
    assert_eq!(snapshot.count, 2);
    let contents: Vec<&str> = snapshot.notes.iter().map(|n| n.content.as_str()).collect();
    assert_eq!(contents, vec!["same-lat", "boundary"]);

    // Subscribers observe the same refresh
    let update = nearby_rx.blocking_recv().expect("nearby update");
    assert_eq!(update.count, 2);

    engine.stop();
}

#[test]
fn test_double_start_is_rejected() {
    let store = Arc::new(MemoryNoteStore::new());
    let location = Arc::new(FixtureLocationSource::manual());
    let engine = create_engine(store, location);

    engine.start().expect("first start");
    match engine.start() {
        Err(LocationError::AlreadySubscribed) => {}
        other => panic!("Expected AlreadySubscribed, got {:?}", other),
    }
    engine.stop();
}

#[test]
fn test_source_rejection_releases_running_flag() {
    let store = Arc::new(MemoryNoteStore::new());
    let location = Arc::new(FixtureLocationSource::manual());
    let engine = create_engine(store, location.clone());

    // Occupy the subscription out from under the engine
    let (tx, _rx) = tokio::sync::mpsc::channel(1);
    location.start_updates(tx).expect("direct subscription");

    // The source's rejection is surfaced (and logged) by start()
    match engine.start() {
        Err(LocationError::AlreadySubscribed) => {}
        other => panic!("Expected AlreadySubscribed, got {:?}", other),
    }

    // The failed start released the engine's running flag, so a later
    // start succeeds once the source frees up
    location.stop_updates();
    engine.start().expect("start after source freed");
    engine.stop();
}

#[test]
fn test_recalibrate_rebaselines_the_stream() {
    let store = Arc::new(MemoryNoteStore::new());
    let location = Arc::new(FixtureLocationSource::manual());
    let engine = create_engine(store, location.clone());

    engine.set_pending_text("hello");

    // Establish a baseline, then recalibrate against a new orientation
    engine.handle_sample(Sample::new(0.0, 0.0, 9.8));
    engine.recalibrate();

    // The raw drop trace shifted by the new baseline still detects
    for _ in 0..6 {
        assert_eq!(
            engine.handle_sample(Sample::new(3.0, 1.0, 4.0)),
            Motion::None
        );
    }
    assert_eq!(
        engine.handle_sample(Sample::new(3.0, -6.0, 20.0)),
        Motion::None
    );
    assert_eq!(
        engine.handle_sample(Sample::new(3.0, -6.0, -11.0)),
        Motion::Drop
    );
    assert_eq!(location.pending_requests(), 1);
}
