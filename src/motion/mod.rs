// Motion - accelerometer sample types and the per-tick processing pipeline
//
// A raw sensor tick flows through the Calibrator (baseline removal) and then
// the GestureDetector (sliding-window drop heuristic). Both are owned by a
// single MotionPipeline so exactly one logical thread of control mutates the
// calibration offset and the sample history.

pub mod calibrator;
pub mod detector;

pub use calibrator::Calibrator;
pub use detector::GestureDetector;

use serde::{Deserialize, Serialize};

use crate::config::GestureConfig;

/// One 3-axis accelerometer reading, in the sensor's own units.
///
/// Samples are ephemeral: they pass through the pipeline once and are
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Sample {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The zero vector, returned by the first calibration pass.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Motion classes the detector can report.
///
/// Only `Drop` and `None` are currently produced; `Pickup` and `Shake`
/// are reserved for future heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    /// Free-fall followed by a catch
    Drop,
    /// Reserved
    Pickup,
    /// Reserved
    Shake,
    /// No significant motion
    None,
}

/// Calibrator + detector, processed in order for every sensor tick.
pub struct MotionPipeline {
    calibrator: Calibrator,
    detector: GestureDetector,
}

/// Result of one pipeline pass: the calibrated sample and its classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionReading {
    pub sample: Sample,
    pub motion: Motion,
}

impl MotionPipeline {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            calibrator: Calibrator::new(),
            detector: GestureDetector::new(config),
        }
    }

    /// Process one raw sensor tick: calibrate, then classify.
    pub fn process(&mut self, raw: Sample) -> MotionReading {
        let sample = self.calibrator.calibrate(raw);
        let motion = self.detector.detect(sample);
        MotionReading { sample, motion }
    }

    /// Rebaseline on the next tick. The sample history is logically
    /// invalidated by the epoch change but not physically cleared,
    /// matching the original behavior.
    pub fn recalibrate(&mut self) {
        self.calibrator.recalibrate();
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrator.is_calibrated()
    }
}
