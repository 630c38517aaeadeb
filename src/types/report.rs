//! Status report pushed to renderers on every tick

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::types::{BandSnapshot, DimensionStatus, ReasonCode, Telemetry};

/// Everything a renderer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Wall-clock time of the tick
    pub timestamp: DateTime<Utc>,
    /// Milliseconds since session start
    pub uptime_ms: u64,
    /// Current class
    pub status: DimensionStatus,
    /// Why the class is what it is
    pub reason: ReasonCode,
    /// Calibration progress, 0-100
    pub calibration_progress: u8,
    /// Φ from the current band averages
    pub phi_current: f64,
    /// Slow EMA of Φ
    pub phi_baseline: f64,
    /// Fast EMA of Φ
    pub phi_short_term: f64,
    /// Stability in [80, 100], None while calibrating
    pub stability: Option<f64>,
    /// Match in [0, 100], None while calibrating
    pub match_percent: Option<f64>,
    /// |Φ − baseline| / baseline, None while calibrating
    pub tracking_error: Option<f64>,
    /// Raw and averaged RSSI per band
    pub bands: BandSnapshot,
    /// Samples held in each rolling buffer
    pub buffer_fill: usize,
    /// Ticks since start or last recalibration
    pub total_samples: u64,
    /// Battery and temperature
    pub telemetry: Telemetry,
}

impl StatusReport {
    /// Has the baseline been seeded?
    pub fn is_calibrated(&self) -> bool {
        self.status.is_classified()
    }

    /// Stability for display
    pub fn display_stability(&self) -> String {
        match self.stability {
            Some(v) => format!("{:.1}%", v),
            None => "--".to_string(),
        }
    }

    /// Match for display
    pub fn display_match(&self) -> String {
        match self.match_percent {
            Some(v) => format!("{:.1}%", v),
            None => "--".to_string(),
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let line = if self.is_calibrated() {
            format!(
                "{} Φ={:.4} | base={:.4} | stability={} | match={} | n={}",
                self.status.banner(),
                self.phi_current,
                self.phi_baseline,
                self.display_stability(),
                self.display_match(),
                self.total_samples
            )
        } else {
            format!(
                "{} calibrating {}% | Φ={:.4} | n={}",
                self.status.banner(),
                self.calibration_progress,
                self.phi_current,
                self.total_samples
            )
        };
        line.color(self.status.color()).to_string()
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "status={} | phi={:.6} | baseline={:.6} | short={:.6} | stability={} | match={} | fill={} | n={} | reason={}",
            self.status,
            self.phi_current,
            self.phi_baseline,
            self.phi_short_term,
            self.display_stability(),
            self.display_match(),
            self.buffer_fill,
            self.total_samples,
            self.reason.code()
        )
    }
}
