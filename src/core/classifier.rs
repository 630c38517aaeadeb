//! Classifier: stability metrics and the four-level ladder
//!
//! Classification is on tracking error (how far Φ sits from its adaptive
//! baseline), not on absolute deviation. Stability is compressed into
//! [80, 100] so sensor noise alone never reads as instability:
//!
//! - stability = clamp(100 − 20·e, 80, 100)
//! - match     = clamp(100·(1 − 2·e), 0, 100)

use serde::{Deserialize, Serialize};

use crate::types::DimensionStatus;
use crate::{BASELINE_GUARD, HOME_THRESHOLD, STABILITY_FLOOR, STABILITY_SLOPE, STABLE_THRESHOLD, UNSTABLE_THRESHOLD};

/// Derived metrics for one running tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityMetrics {
    /// |Φ − baseline| / baseline
    pub tracking_error: f64,
    /// In [80, 100]
    pub stability: f64,
    /// In [0, 100]
    pub match_percent: f64,
}

impl StabilityMetrics {
    /// Metrics for Φ against its baseline; a ~0 baseline reads as perfect
    pub fn compute(phi_current: f64, phi_baseline: f64) -> Self {
        let tracking_error = tracking_error(phi_current, phi_baseline).unwrap_or(0.0);
        Self {
            tracking_error,
            stability: stability_from_error(tracking_error),
            match_percent: match_from_error(tracking_error),
        }
    }
}

/// Relative distance of Φ from its baseline, None when the baseline is ~0
pub fn tracking_error(phi_current: f64, phi_baseline: f64) -> Option<f64> {
    if !(phi_baseline >= BASELINE_GUARD) {
        return None;
    }
    let e = (phi_current - phi_baseline).abs() / phi_baseline;
    e.is_finite().then_some(e)
}

/// Compressed stability in [80, 100]
pub fn stability_from_error(tracking_error: f64) -> f64 {
    (100.0 - STABILITY_SLOPE * tracking_error).clamp(STABILITY_FLOOR, 100.0)
}

/// Harsher distance-to-baseline in [0, 100]
pub fn match_from_error(tracking_error: f64) -> f64 {
    (100.0 * (1.0 - 2.0 * tracking_error)).clamp(0.0, 100.0)
}

/// Class boundaries on the stability scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub home: f64,
    pub stable: f64,
    pub unstable: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            home: HOME_THRESHOLD,
            stable: STABLE_THRESHOLD,
            unstable: UNSTABLE_THRESHOLD,
        }
    }
}

/// Maps stability onto the ladder
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    thresholds: Thresholds,
}

impl Classifier {
    /// Classifier with the given boundaries
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Class for a stability value
    pub fn classify(&self, stability: f64) -> DimensionStatus {
        let t = &self.thresholds;
        if stability >= t.home {
            DimensionStatus::Home
        } else if stability >= t.stable {
            DimensionStatus::Stable
        } else if stability >= t.unstable {
            DimensionStatus::Unstable
        } else {
            DimensionStatus::Foreign
        }
    }

    /// Active boundaries
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }
}

// =============================================================================
// TESTS
// =============================================================================
