//! Phi Engine: dimensional ratio and its two EMAs
//!
//! Φ = (LF · UHF) / HF², computed on linear magnitudes of the band averages.
//! RSSI is shifted by +120 dB (floored at 0.1) before the dB → linear step,
//! which keeps Φ out of the subnormal range raw dBm would produce.
//!
//! Two EMAs run once calibrated:
//! - baseline (α = 0.05) follows ambient drift
//! - short-term (α = 0.15) follows transients

use serde::{Deserialize, Serialize};

use crate::{ALPHA_FAST, ALPHA_SLOW, HF_LINEAR_GUARD, NORMALIZED_FLOOR, RSSI_OFFSET_DB};

/// Shift RSSI into the positive range used for exponentiation
pub fn normalize_db(db: f64) -> f64 {
    (db + RSSI_OFFSET_DB).max(NORMALIZED_FLOOR)
}

/// dB → linear magnitude
pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Φ from linear magnitudes; 0 when HF is too small or the result is not finite
pub fn phi_from_linear(lf_lin: f64, hf_lin: f64, uhf_lin: f64) -> f64 {
    if !(hf_lin >= HF_LINEAR_GUARD) {
        return 0.0;
    }
    let phi = (lf_lin * uhf_lin) / (hf_lin * hf_lin);
    if phi.is_finite() {
        phi
    } else {
        0.0
    }
}

/// Φ from band averages in dBm
pub fn calculate_phi(lf_db: f64, hf_db: f64, uhf_db: f64) -> f64 {
    phi_from_linear(
        db_to_linear(normalize_db(lf_db)),
        db_to_linear(normalize_db(hf_db)),
        db_to_linear(normalize_db(uhf_db)),
    )
}

/// One EMA step: y ← α·x + (1 − α)·y
pub fn ema(alpha: f64, sample: f64, previous: f64) -> f64 {
    alpha * sample + (1.0 - alpha) * previous
}

/// Φ values tracked across ticks
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhiState {
    /// Φ from the current averages
    pub phi_current: f64,
    /// Slow EMA ("where you are now")
    pub phi_baseline: f64,
    /// Fast EMA (short-term trend)
    pub phi_short_term: f64,
}

/// Computes Φ and maintains its EMAs
#[derive(Debug, Clone)]
pub struct PhiEngine {
    state: PhiState,
    alpha_slow: f64,
    alpha_fast: f64,
}

impl Default for PhiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhiEngine {
    /// Engine with the default EMA rates
    pub fn new() -> Self {
        Self::with_rates(ALPHA_SLOW, ALPHA_FAST)
    }

    /// Engine with custom EMA rates
    pub fn with_rates(alpha_slow: f64, alpha_fast: f64) -> Self {
        Self {
            state: PhiState::default(),
            alpha_slow,
            alpha_fast,
        }
    }

    /// Recompute Φ from the band averages
    pub fn observe(&mut self, lf_avg: f64, hf_avg: f64, uhf_avg: f64) -> f64 {
        self.state.phi_current = calculate_phi(lf_avg, hf_avg, uhf_avg);
        self.state.phi_current
    }

    /// Set Φ directly (bypasses normalization)
    pub fn set_current(&mut self, phi: f64) {
        self.state.phi_current = phi;
    }

    /// Start both EMAs at the current Φ
    pub fn seed(&mut self) {
        self.state.phi_baseline = self.state.phi_current;
        self.state.phi_short_term = self.state.phi_current;
    }

    /// Advance both EMAs by one tick
    pub fn update_emas(&mut self) {
        let phi = self.state.phi_current;
        self.state.phi_baseline = ema(self.alpha_slow, phi, self.state.phi_baseline);
        self.state.phi_short_term = ema(self.alpha_fast, phi, self.state.phi_short_term);
    }

    /// Current Φ values
    pub fn state(&self) -> PhiState {
        self.state
    }

    /// Clear all Φ values
    pub fn reset(&mut self) {
        self.state = PhiState::default();
    }
}

// =============================================================================
// TESTS
// =============================================================================
