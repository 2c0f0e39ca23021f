// Notes - the geo-tagged note record and its append-only persistence
//
// A Note is created once, at the moment a drop gesture coincides with
// non-empty pending text and a resolved location, and never mutated.
// Persistence is a whole-list JSON round trip (the original used a
// key-value store holding one serialized list), so the store is a simple
// read-modify-write behind a mutex.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::geo::GeoPoint;

/// Immutable geo-tagged note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub content: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Note {
    pub fn new(content: String, latitude: f64, longitude: f64) -> Self {
        Self {
            content,
            latitude,
            longitude,
        }
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Note: {} Longitude: {} Latitude: {}",
            self.content, self.longitude, self.latitude
        )
    }
}

/// Append-only note persistence.
///
/// No explicit identifiers: append-only list semantics, deletion by value
/// equality only (legacy operation). Implementations must be safe to call
/// from the engine's worker threads.
pub trait NoteStore: Send + Sync {
    /// Append one note to the stored list.
    fn append(&self, note: &Note) -> Result<(), StoreError>;

    /// Load every stored note, oldest first.
    fn load_all(&self) -> Result<Vec<Note>, StoreError>;

    /// Remove the first note equal to `note`, if any.
    #[deprecated(note = "legacy path; notes are meant to be append-only")]
    fn delete(&self, note: &Note) -> Result<(), StoreError>;
}

/// File-backed store serializing the full note list as one JSON document.
pub struct JsonNoteStore {
    path: PathBuf,
    // Serializes read-modify-write cycles across engine worker threads
    write_lock: Mutex<()>,
}

impl JsonNoteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_list(&self) -> Result<Vec<Note>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            // A store that was never written to is an empty list
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let notes = serde_json::from_str(&contents)?;
        Ok(notes)
    }

    fn write_list(&self, notes: &[Note]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string(notes)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl NoteStore for JsonNoteStore {
    fn append(&self, note: &Note) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?;

        let mut notes = self.read_list()?;
        notes.push(note.clone());
        self.write_list(&notes)?;
        log::debug!("[Store] Appended note, {} total", notes.len());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Note>, StoreError> {
        self.read_list()
    }

    fn delete(&self, note: &Note) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?;

        let mut notes = self.read_list()?;
        if let Some(position) = notes.iter().position(|stored| stored == note) {
            notes.remove(position);
            self.write_list(&notes)?;
        }
        Ok(())
    }
}
