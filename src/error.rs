// Error types for the dropnote engine
//
// This module defines custom error types for note persistence and location
// operations, providing structured error handling with error codes suitable
// for surfacing across an FFI or IPC boundary.

use log::error;
use std::fmt;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling at the
/// boundary to UI collaborators.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Log a store error with structured context
pub fn log_store_error(err: &StoreError, context: &str) {
    error!(
        "Store error in {}: code={}, component=NoteStore, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Log a location error with structured context
pub fn log_location_error(err: &LocationError, context: &str) {
    error!(
        "Location error in {}: code={}, component=LocationSource, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Note persistence errors
///
/// These errors cover reading and writing the append-only note list.
///
/// Error code ranges: 1001-1003
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Underlying file I/O failed
    Io { details: String },

    /// Stored note list could not be decoded
    Corrupt { details: String },

    /// Store mutex was poisoned
    LockPoisoned,
}

impl ErrorCode for StoreError {
    fn code(&self) -> i32 {
        match self {
            StoreError::Io { .. } => 1001,
            StoreError::Corrupt { .. } => 1002,
            StoreError::LockPoisoned => 1003,
        }
    }

    fn message(&self) -> String {
        match self {
            StoreError::Io { details } => {
                format!("Note store I/O failed: {}", details)
            }
            StoreError::Corrupt { details } => {
                format!("Stored note list is corrupt: {}", details)
            }
            StoreError::LockPoisoned => "Note store lock poisoned".to_string(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoreError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for StoreError {}

/// Convert from std::io::Error to StoreError
impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io {
            details: err.to_string(),
        }
    }
}

/// Convert from serde_json::Error to StoreError
impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Corrupt {
            details: err.to_string(),
        }
    }
}

/// Location-related errors
///
/// These errors cover starting and stopping the continuous update
/// subscription. One-shot request failures are reported as an absent
/// result (the reply channel closes), not as an error value.
///
/// Error code ranges: 2001-2003
#[derive(Debug, Clone, PartialEq)]
pub enum LocationError {
    /// Location provider is not available on this platform
    Unavailable,

    /// Location permission was denied
    PermissionDenied,

    /// Update subscription is already running
    AlreadySubscribed,
}

impl ErrorCode for LocationError {
    fn code(&self) -> i32 {
        match self {
            LocationError::Unavailable => 2001,
            LocationError::PermissionDenied => 2002,
            LocationError::AlreadySubscribed => 2003,
        }
    }

    fn message(&self) -> String {
        match self {
            LocationError::Unavailable => "Location provider unavailable".to_string(),
            LocationError::PermissionDenied => "Location permission denied".to_string(),
            LocationError::AlreadySubscribed => {
                "Location updates already subscribed. Call stop_updates() first.".to_string()
            }
        }
    }
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LocationError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for LocationError {}
