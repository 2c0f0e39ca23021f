//! Configuration management for dynamic parameter tuning
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling iteration on the gesture thresholds and proximity tolerance
//! without recompilation. Defaults match the values the drop heuristic
//! was tuned with, so a missing config file changes nothing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub gesture: GestureConfig,
    pub proximity: ProximityConfig,
    pub store: StoreConfig,
}

/// Drop-gesture detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Z value the catch spike must exceed (sample units)
    pub z_rise_threshold: f32,
    /// Z value the post-catch rebound must fall below
    pub z_fall_threshold: f32,
    /// Y deflection the catch must fall below on the middle sample
    pub y_fall_threshold: f32,
    /// Capacity of the circular sample history
    pub buffer_size: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            z_rise_threshold: 15.0,
            z_fall_threshold: -10.0,
            y_fall_threshold: -6.0,
            buffer_size: 10,
        }
    }
}

/// Proximity filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityConfig {
    /// Per-axis tolerance in degrees for the nearby-note predicate
    pub tolerance_deg: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            tolerance_deg: 0.0004,
        }
    }
}

/// Note persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON file holding the note list
    pub notes_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            notes_path: PathBuf::from("notes.json"),
        }
    }
}

impl Default for AppConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            proximity: ProximityConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file is missing
    /// or contains invalid JSON.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::load_from_file("assets/dropnote_config.json")
    }
}
