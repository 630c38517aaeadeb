//! Calibrator: CALIBRATING → RUNNING
//!
//! Stays in CALIBRATING until the rolling windows hold the required number
//! of samples, then signals the tick on which the baselines must be seeded.
//! Only an explicit reset returns it to CALIBRATING.

use serde::{Deserialize, Serialize};

use crate::CALIBRATION_SAMPLES;

/// Calibration phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalibrationPhase {
    /// Accumulating samples, no baseline yet
    Calibrating,
    /// Baseline seeded, metrics produced every tick
    Running,
}

/// Calibration state machine
#[derive(Debug, Clone)]
pub struct Calibrator {
    phase: CalibrationPhase,
    required: usize,
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new(CALIBRATION_SAMPLES)
    }
}

impl Calibrator {
    /// Calibrator needing `required` samples
    pub fn new(required: usize) -> Self {
        Self {
            phase: CalibrationPhase::Calibrating,
            required: required.max(1),
        }
    }

    /// Check buffer fill; returns true on the tick calibration completes
    pub fn check(&mut self, fill: usize) -> bool {
        if self.phase == CalibrationPhase::Calibrating && fill >= self.required {
            self.phase = CalibrationPhase::Running;
            return true;
        }
        false
    }

    /// Has the baseline been seeded?
    pub fn is_calibrated(&self) -> bool {
        self.phase == CalibrationPhase::Running
    }

    /// Current phase
    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    /// Samples needed to leave CALIBRATING
    pub fn required(&self) -> usize {
        self.required
    }

    /// Progress toward calibration, 0-100
    pub fn progress(&self, fill: usize) -> u8 {
        if self.is_calibrated() {
            return 100;
        }
        (fill.min(self.required) * 100 / self.required) as u8
    }

    /// Back to CALIBRATING
    pub fn reset(&mut self) {
        self.phase = CalibrationPhase::Calibrating;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_phase() {
        let cal = Calibrator::default();
        assert_eq!(cal.phase(), CalibrationPhase::Calibrating);
        assert!(!cal.is_calibrated());
    }

    #[test]
    fn test_completes_once() {
        let mut cal = Calibrator::new(100);
        for fill in 1..100 {
            assert!(!cal.check(fill));
        }
        assert!(cal.check(100));
        assert!(cal.is_calibrated());
        assert!(!cal.check(101));
        assert!(!cal.check(1000));
        assert!(cal.is_calibrated());
    }

    #[test]
    fn test_progress() {
        let cal = Calibrator::new(100);
        assert_eq!(cal.progress(0), 0);
        assert_eq!(cal.progress(1), 1);
        assert_eq!(cal.progress(99), 99);
        assert_eq!(cal.progress(250), 100);

        let cal = Calibrator::new(3);
        assert_eq!(cal.progress(1), 33);
    }

    #[test]
    fn test_reset() {
        let mut cal = Calibrator::new(2);
        cal.check(2);
        cal.reset();
        assert!(!cal.is_calibrated());
        assert!(cal.check(2));
    }
}
