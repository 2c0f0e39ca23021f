// GestureDetector - heuristic sliding-window drop classification
//
// A true free-fall followed by a sudden catch produces a characteristic
// Z-axis spike (catch deceleration) preceded by a near-zero or negative Z
// (free fall), with a simultaneous negative Y deflection as the hand
// arrests the fall. The detector keeps a fixed-length circular history of
// calibrated Y/Z values and scans it for that three-point rise/fall/fall
// shape on every tick. Deliberately cheap: fixed thresholds, no per-call
// allocation, suited to fastest-delay sensor rates on constrained devices.
//
// Known limitation: the scan walks physical buffer slots, so a qualifying
// triplet that straddles the wrap boundary (slots capacity-1 and 0) is not
// detected. This asymmetry is inherited behavior, kept for compatibility
// and pinned by tests rather than fixed.

use crate::config::GestureConfig;

use super::{Motion, Sample};

/// Classifies calibrated samples into motion classes.
///
/// Pure function of the current sample and buffer state; no failure
/// conditions. Single-writer, like the Calibrator.
pub struct GestureDetector {
    config: GestureConfig,
    z_buffer: Vec<f32>,
    y_buffer: Vec<f32>,
    cursor: usize,
}

impl GestureDetector {
    pub fn new(config: GestureConfig) -> Self {
        // A window shorter than the three-point pattern cannot match anything
        assert!(
            config.buffer_size >= 3,
            "gesture buffer must hold at least one 3-sample window"
        );
        let capacity = config.buffer_size;
        Self {
            config,
            z_buffer: vec![0.0; capacity],
            y_buffer: vec![0.0; capacity],
            cursor: 0,
        }
    }

    /// Append one calibrated sample to the history and classify.
    ///
    /// Scans the raw storage slots (not chronological order) for the first
    /// window satisfying the rise, fall, and cross-axis conditions; first
    /// match wins.
    pub fn detect(&mut self, sample: Sample) -> Motion {
        let capacity = self.z_buffer.len();

        self.z_buffer[self.cursor] = sample.z;
        self.y_buffer[self.cursor] = sample.y;
        self.cursor = (self.cursor + 1) % capacity;

        for i in 0..capacity - 2 {
            let rise = self.z_buffer[i] < self.config.z_rise_threshold
                && self.z_buffer[i + 1] > self.config.z_rise_threshold;
            let fall = self.z_buffer[i + 2] < self.config.z_fall_threshold;
            let cross_axis = self.y_buffer[i + 1] < self.config.y_fall_threshold;

            if rise && fall && cross_axis {
                return Motion::Drop;
            }
        }

        Motion::None
    }
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;
