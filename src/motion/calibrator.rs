// Calibrator - per-axis zero-offset baseline removal
//
// The first sample after construction or recalibrate() is recorded verbatim
// as the offset and every later sample has it subtracted component-wise.
// This normalizes out device orientation and gravity bias so the detector
// thresholds work regardless of how the device is held.

use super::Sample;

/// Removes a per-axis baseline from raw accelerometer samples.
///
/// Total function over well-formed samples; never fails. Single-writer:
/// callers hold exclusive access for the lifetime of a listening session.
#[derive(Debug, Default)]
pub struct Calibrator {
    offset: Sample,
    calibrated: bool,
}

impl Calibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calibrate one raw sample.
    ///
    /// The first call of a calibration epoch captures `raw` as the new
    /// offset and returns the zero vector. Every later call returns
    /// `raw - offset` component-wise.
    pub fn calibrate(&mut self, raw: Sample) -> Sample {
        if !self.calibrated {
            self.offset = raw;
            self.calibrated = true;
        }
        Sample::new(
            raw.x - self.offset.x,
            raw.y - self.offset.y,
            raw.z - self.offset.z,
        )
    }

    /// Reset the calibration flag so the next sample rebaselines.
    ///
    /// Idempotent. The stale offset is left in place; it is overwritten
    /// before its next use.
    pub fn recalibrate(&mut self) {
        self.calibrated = false;
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_becomes_baseline() {
        let mut calibrator = Calibrator::new();

        // Exactly representable values keep the component-wise subtraction exact
        let r0 = Sample::new(0.25, -0.5, 9.75);
        assert_eq!(calibrator.calibrate(r0), Sample::zero());

        let r1 = Sample::new(1.25, -0.5, 7.75);
        assert_eq!(calibrator.calibrate(r1), Sample::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn test_recalibrate_resets_baseline_on_next_sample() {
        let mut calibrator = Calibrator::new();

        calibrator.calibrate(Sample::new(0.0, 0.0, 9.8));
        calibrator.calibrate(Sample::new(0.5, 0.5, 9.8));

        calibrator.recalibrate();
        assert!(!calibrator.is_calibrated());

        // Next sample becomes the new baseline, not measured against the old one
        assert_eq!(
            calibrator.calibrate(Sample::new(9.8, 0.0, 0.0)),
            Sample::zero()
        );
        assert_eq!(
            calibrator.calibrate(Sample::new(9.8, 1.0, 0.0)),
            Sample::new(0.0, 1.0, 0.0)
        );
    }

    #[test]
    fn test_recalibrate_is_idempotent() {
        let mut calibrator = Calibrator::new();
        calibrator.calibrate(Sample::new(1.0, 1.0, 1.0));

        calibrator.recalibrate();
        calibrator.recalibrate();

        assert_eq!(calibrator.calibrate(Sample::new(2.0, 2.0, 2.0)), Sample::zero());
    }
}
