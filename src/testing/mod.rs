//! Test and simulation fixtures
//!
//! Deterministic stand-ins for the platform collaborators: a location
//! source whose fixes the caller scripts, and an in-memory note store
//! with injectable append failures. Used by the integration tests and
//! the `dropnote-sim` binary; no platform access required.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio::sync::{mpsc, oneshot};

use crate::error::{LocationError, StoreError};
use crate::geo::GeoPoint;
use crate::location::LocationSource;
use crate::notes::{Note, NoteStore};

/// Scriptable location source.
///
/// In `resolving` mode every one-shot request is answered immediately with
/// a fixed point. In `manual` mode requests queue up until the test calls
/// [`resolve`](Self::resolve) or [`drop_pending`](Self::drop_pending),
/// which makes request/resolution interleavings deterministic.
pub struct FixtureLocationSource {
    fix: Mutex<Option<GeoPoint>>,
    pending: Mutex<Vec<oneshot::Sender<GeoPoint>>>,
    updates: Mutex<Option<mpsc::Sender<GeoPoint>>>,
}

impl FixtureLocationSource {
    /// Source that resolves every one-shot request immediately with `point`.
    pub fn resolving(point: GeoPoint) -> Self {
        Self {
            fix: Mutex::new(Some(point)),
            pending: Mutex::new(Vec::new()),
            updates: Mutex::new(None),
        }
    }

    /// Source that queues one-shot requests for explicit resolution.
    pub fn manual() -> Self {
        Self {
            fix: Mutex::new(None),
            pending: Mutex::new(Vec::new()),
            updates: Mutex::new(None),
        }
    }

    /// Resolve all queued one-shot requests with `point`.
    ///
    /// Returns how many requests were resolved.
    pub fn resolve(&self, point: GeoPoint) -> usize {
        let senders: Vec<_> = self.pending.lock().unwrap().drain(..).collect();
        let count = senders.len();
        for sender in senders {
            let _ = sender.send(point);
        }
        count
    }

    /// Drop all queued one-shot requests without resolving them,
    /// simulating provider failure or timeout.
    pub fn drop_pending(&self) -> usize {
        let senders: Vec<_> = self.pending.lock().unwrap().drain(..).collect();
        senders.len()
    }

    /// Number of one-shot requests currently queued.
    pub fn pending_requests(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Push one periodic update into a running subscription.
    ///
    /// Returns false when no subscription is active or the consumer is gone.
    pub fn push_update(&self, point: GeoPoint) -> bool {
        let sender = self.updates.lock().unwrap().clone();
        match sender {
            Some(tx) => tx.blocking_send(point).is_ok(),
            None => false,
        }
    }
}

impl LocationSource for FixtureLocationSource {
    fn request_once(&self, reply: oneshot::Sender<GeoPoint>) {
        let fix = *self.fix.lock().unwrap();
        match fix {
            Some(point) => {
                let _ = reply.send(point);
            }
            None => self.pending.lock().unwrap().push(reply),
        }
    }

    fn start_updates(&self, updates: mpsc::Sender<GeoPoint>) -> Result<(), LocationError> {
        let mut slot = self.updates.lock().unwrap();
        if slot.is_some() {
            return Err(LocationError::AlreadySubscribed);
        }
        *slot = Some(updates);
        Ok(())
    }

    fn stop_updates(&self) {
        // Dropping the sender closes the update stream
        self.updates.lock().unwrap().take();
    }
}

/// In-memory note store with injectable append failures.
pub struct MemoryNoteStore {
    notes: Mutex<Vec<Note>>,
    fail_append: AtomicBool,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self {
            notes: Mutex::new(Vec::new()),
            fail_append: AtomicBool::new(false),
        }
    }

    /// Make subsequent append calls fail until called again with false.
    pub fn set_fail_append(&self, fail: bool) {
        self.fail_append.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.notes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryNoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteStore for MemoryNoteStore {
    fn append(&self, note: &Note) -> Result<(), StoreError> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                details: "injected append failure".to_string(),
            });
        }
        self.notes.lock().unwrap().push(note.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Note>, StoreError> {
        Ok(self.notes.lock().unwrap().clone())
    }

    fn delete(&self, note: &Note) -> Result<(), StoreError> {
        let mut notes = self.notes.lock().unwrap();
        if let Some(position) = notes.iter().position(|stored| stored == note) {
            notes.remove(position);
        }
        Ok(())
    }
}
