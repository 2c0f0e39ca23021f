// NoteEngine: sensor-to-note orchestration layer
//
// Wires the motion pipeline, the one-shot location request, the note store
// and the proximity filter into one capture cycle:
//
//   Idle -> (Drop && pending text non-empty) -> LocationRequested
//        -> (location resolved) -> note persisted -> Idle
//
// The sensor tick path (handle_sample) is synchronous on the caller's
// thread and never blocks on location or persistence; location resolution
// runs on short-lived worker threads feeding back through the shared state.
// Periodic location updates are an independent channel that refreshes the
// proximity-filtered note set regardless of gesture activity.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::config::AppConfig;
use crate::error::{log_location_error, log_store_error, LocationError};
use crate::geo::{GeoPoint, ProximityFilter};
use crate::location::LocationSource;
use crate::managers::BroadcastChannelManager;
use crate::motion::{Motion, MotionPipeline, Sample};
use crate::notes::{Note, NoteStore};

/// Classified gesture event published on the motion channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionEvent {
    pub motion: Motion,
    /// The calibrated sample that completed the pattern
    pub sample: Sample,
}

/// Refreshed proximity-filtered note set published on the nearby channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyUpdate {
    /// Reference point the filter ran against
    pub reference: GeoPoint,
    pub notes: Vec<Note>,
    pub count: usize,
}

/// Phase of the current note-capture cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    /// A one-shot location request is in flight for a triggered drop
    LocationRequested,
}

/// State shared with the engine's worker threads.
struct Shared {
    filter: ProximityFilter,
    store: Arc<dyn NoteStore>,
    pending_text: Mutex<String>,
    capture_state: Mutex<CaptureState>,
    broadcasts: BroadcastChannelManager,
    nearby_snapshot: Mutex<Option<NearbyUpdate>>,
}

impl Shared {
    /// Finish a capture cycle for a resolved one-shot fix.
    ///
    /// `text` was captured at the moment of the triggering drop, so a
    /// concurrent edit of the pending text cannot leak into this note.
    fn complete_capture(&self, text: String, point: GeoPoint) {
        let note = Note::new(text.clone(), point.latitude, point.longitude);

        match self.store.append(&note) {
            Ok(()) => {
                log::info!(
                    "[Engine] Persisted note at ({}, {})",
                    point.latitude,
                    point.longitude
                );
                // Clear the pending text only if it still matches what this
                // cycle captured; a newer draft belongs to the next gesture.
                match self.pending_text.lock() {
                    Ok(mut pending) => {
                        if *pending == text {
                            pending.clear();
                        }
                    }
                    Err(_) => log::error!("[Engine] Pending text lock poisoned"),
                }
            }
            Err(err) => {
                // Retain the pending text so the next gesture can retry
                log_store_error(&err, "complete_capture");
            }
        }

        self.refresh_nearby(point);
        self.set_capture_state(CaptureState::Idle);
    }

    /// Re-filter all stored notes against `reference` and publish the result.
    fn refresh_nearby(&self, reference: GeoPoint) {
        let notes = match self.store.load_all() {
            Ok(notes) => notes,
            Err(err) => {
                log_store_error(&err, "refresh_nearby");
                Vec::new()
            }
        };

        let nearby = self.filter.notes_in_radius(reference, &notes);
        let update = NearbyUpdate {
            reference,
            count: nearby.len(),
            notes: nearby,
        };

        match self.nearby_snapshot.lock() {
            Ok(mut snapshot) => *snapshot = Some(update.clone()),
            Err(_) => log::error!("[Engine] Nearby snapshot lock poisoned"),
        }

        if let Some(tx) = self.broadcasts.nearby_sender() {
            let _ = tx.send(update);
        }
    }

    fn set_capture_state(&self, state: CaptureState) {
        match self.capture_state.lock() {
            Ok(mut guard) => *guard = state,
            Err(_) => log::error!("[Engine] Capture state lock poisoned"),
        }
    }
}

/// Orchestrates the drop-gesture note capture pipeline.
pub struct NoteEngine {
    shared: Arc<Shared>,
    // Single-writer motion state; the mutex enforces the one-logical-thread
    // invariant rather than arbitrating real contention.
    pipeline: Mutex<MotionPipeline>,
    location: Arc<dyn LocationSource>,
    updates_running: AtomicBool,
}

impl NoteEngine {
    /// Create a new NoteEngine over the given store and location source.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn NoteStore>,
        location: Arc<dyn LocationSource>,
    ) -> Self {
        let broadcasts = BroadcastChannelManager::new();
        broadcasts.init_motion();
        broadcasts.init_nearby();

        let shared = Arc::new(Shared {
            filter: ProximityFilter::new(&config.proximity),
            store,
            pending_text: Mutex::new(String::new()),
            capture_state: Mutex::new(CaptureState::Idle),
            broadcasts,
            nearby_snapshot: Mutex::new(None),
        });

        Self {
            shared,
            pipeline: Mutex::new(MotionPipeline::new(config.gesture)),
            location,
            updates_running: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // SENSOR TICK PATH
    // ========================================================================

    /// Process one raw accelerometer tick.
    ///
    /// Calibrates, classifies, and on a `Drop` with non-empty pending text
    /// fires the one-shot location request. Never blocks on location or
    /// persistence. Must be driven by a single logical sensor thread.
    pub fn handle_sample(&self, raw: Sample) -> Motion {
        let reading = match self.pipeline.lock() {
            Ok(mut pipeline) => pipeline.process(raw),
            Err(_) => {
                log::error!("[Engine] Motion pipeline lock poisoned in handle_sample");
                return Motion::None;
            }
        };

        if reading.motion != Motion::None {
            if let Some(tx) = self.shared.broadcasts.motion_sender() {
                let _ = tx.send(MotionEvent {
                    motion: reading.motion,
                    sample: reading.sample,
                });
            }
        }

        if reading.motion == Motion::Drop {
            let text = self.pending_text();
            if !text.is_empty() {
                // Re-entrancy is deliberately not suppressed: a second drop
                // while a request is in flight fires its own request, as the
                // original did.
                self.begin_capture(text);
            }
        }

        reading.motion
    }

    /// Rebaseline calibration on the next tick.
    pub fn recalibrate(&self) {
        match self.pipeline.lock() {
            Ok(mut pipeline) => pipeline.recalibrate(),
            Err(_) => log::error!("[Engine] Motion pipeline lock poisoned in recalibrate"),
        }
    }

    fn begin_capture(&self, text: String) {
        self.shared.set_capture_state(CaptureState::LocationRequested);

        let (reply_tx, reply_rx) = oneshot::channel();
        self.location.request_once(reply_tx);

        let shared = Arc::clone(&self.shared);
        std::thread::spawn(move || match reply_rx.blocking_recv() {
            Ok(point) => shared.complete_capture(text, point),
            Err(_) => {
                // No fix arrived; stay in LocationRequested with the pending
                // text intact so the next gesture retries.
                log::warn!("[Engine] One-shot location request closed without a fix");
            }
        });
    }

    // ========================================================================
    // PENDING TEXT
    // ========================================================================

    /// Replace the pending note text for the next capture.
    pub fn set_pending_text(&self, text: &str) {
        match self.shared.pending_text.lock() {
            Ok(mut pending) => {
                pending.clear();
                pending.push_str(text);
            }
            Err(_) => log::error!("[Engine] Pending text lock poisoned in set_pending_text"),
        }
    }

    pub fn pending_text(&self) -> String {
        match self.shared.pending_text.lock() {
            Ok(pending) => pending.clone(),
            Err(_) => {
                log::error!("[Engine] Pending text lock poisoned in pending_text");
                String::new()
            }
        }
    }

    // ========================================================================
    // PERIODIC LOCATION UPDATES
    // ========================================================================

    /// Start consuming periodic location updates.
    ///
    /// Every update re-filters all persisted notes and publishes the
    /// refreshed nearby set. Independent of the gesture capture path.
    pub fn start(&self) -> Result<(), LocationError> {
        if self
            .updates_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(LocationError::AlreadySubscribed);
        }

        let (tx, mut rx) = mpsc::channel(16);
        if let Err(err) = self.location.start_updates(tx) {
            log_location_error(&err, "start");
            self.updates_running.store(false, Ordering::SeqCst);
            return Err(err);
        }

        let shared = Arc::clone(&self.shared);
        std::thread::spawn(move || {
            while let Some(point) = rx.blocking_recv() {
                shared.refresh_nearby(point);
            }
            log::debug!("[Engine] Location update stream closed");
        });

        Ok(())
    }

    /// Stop the periodic update subscription.
    pub fn stop(&self) {
        self.location.stop_updates();
        self.updates_running.store(false, Ordering::SeqCst);
    }

    // ========================================================================
    // DISPLAY SURFACE
    // ========================================================================

    /// Re-read the last computed nearby set (the "show" request).
    pub fn nearby_snapshot(&self) -> Option<NearbyUpdate> {
        match self.shared.nearby_snapshot.lock() {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => {
                log::error!("[Engine] Nearby snapshot lock poisoned");
                None
            }
        }
    }

    /// Current phase of the capture cycle.
    pub fn capture_state(&self) -> CaptureState {
        match self.shared.capture_state.lock() {
            Ok(state) => *state,
            Err(_) => {
                log::error!("[Engine] Capture state lock poisoned");
                CaptureState::Idle
            }
        }
    }

    pub fn subscribe_motion(&self) -> Option<broadcast::Receiver<MotionEvent>> {
        self.shared.broadcasts.subscribe_motion()
    }

    pub fn subscribe_nearby(&self) -> Option<broadcast::Receiver<NearbyUpdate>> {
        self.shared.broadcasts.subscribe_nearby()
    }
}
