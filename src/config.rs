//! Runtime configuration
//!
//! Defaults come from the constants in `lib.rs`. The window length
//! (`BUFFER_SIZE`) is fixed at compile time and is not part of this struct.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClockError, ClockResult};
use crate::{
    ALPHA_FAST, ALPHA_SLOW, BUFFER_SIZE, CALIBRATION_SAMPLES, HOME_THRESHOLD,
    SAMPLE_INTERVAL_CALIBRATING_MS, SAMPLE_INTERVAL_RUNNING_MS, STABILITY_FLOOR,
    STABLE_THRESHOLD, UNSTABLE_THRESHOLD,
};

/// Tunable parameters of the clock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Samples required before leaving CALIBRATING
    pub calibration_samples: usize,
    /// Slow EMA rate (baseline)
    pub alpha_slow: f64,
    /// Fast EMA rate (short-term trend)
    pub alpha_fast: f64,
    /// stability >= this → HOME
    pub home_threshold: f64,
    /// stability >= this → STABLE
    pub stable_threshold: f64,
    /// stability >= this → UNSTABLE
    pub unstable_threshold: f64,
    /// Tick interval while calibrating (ms)
    pub calibrating_interval_ms: u64,
    /// Tick interval once running (ms)
    pub running_interval_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            calibration_samples: CALIBRATION_SAMPLES,
            alpha_slow: ALPHA_SLOW,
            alpha_fast: ALPHA_FAST,
            home_threshold: HOME_THRESHOLD,
            stable_threshold: STABLE_THRESHOLD,
            unstable_threshold: UNSTABLE_THRESHOLD,
            calibrating_interval_ms: SAMPLE_INTERVAL_CALIBRATING_MS,
            running_interval_ms: SAMPLE_INTERVAL_RUNNING_MS,
        }
    }
}

impl ClockConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> ClockResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: ClockConfig = serde_json::from_str(&json).map_err(ClockError::ConfigParse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every constraint the pipeline relies on
    pub fn validate(&self) -> ClockResult<()> {
        if self.calibration_samples == 0 || self.calibration_samples > BUFFER_SIZE {
            return Err(ClockError::InvalidConfig(format!(
                "calibration_samples must be in 1..={}, got {}",
                BUFFER_SIZE, self.calibration_samples
            )));
        }

        for (name, alpha) in [("alpha_slow", self.alpha_slow), ("alpha_fast", self.alpha_fast)] {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(ClockError::InvalidConfig(format!(
                    "{} must be in (0, 1], got {}",
                    name, alpha
                )));
            }
        }

        let ladder = [self.home_threshold, self.stable_threshold, self.unstable_threshold];
        if ladder.iter().any(|t| !(STABILITY_FLOOR..=100.0).contains(t)) {
            return Err(ClockError::InvalidConfig(format!(
                "thresholds must lie in [{}, 100], got {:?}",
                STABILITY_FLOOR, ladder
            )));
        }
        if !(ladder[0] > ladder[1] && ladder[1] > ladder[2]) {
            return Err(ClockError::InvalidConfig(format!(
                "thresholds must be strictly descending, got {:?}",
                ladder
            )));
        }

        if self.calibrating_interval_ms == 0 || self.running_interval_ms == 0 {
            return Err(ClockError::InvalidConfig(
                "sample intervals must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Tick interval for the given calibration state
    pub fn sample_interval(&self, calibrated: bool) -> Duration {
        if calibrated {
            Duration::from_millis(self.running_interval_ms)
        } else {
            Duration::from_millis(self.calibrating_interval_ms)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
