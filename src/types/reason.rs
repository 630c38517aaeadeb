//! Reason codes attached to every status report

use serde::{Deserialize, Serialize};

/// Why a report carries the class it does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    /// Still accumulating calibration samples
    D001_CALIBRATING,
    /// Baselines seeded on this tick
    D002_CALIBRATION_COMPLETE,
    /// Class unchanged since last tick
    D003_CLASS_MAINTAINED,
    /// Class differs from last tick
    D004_CLASS_CHANGED,
    /// Calibration reset by request, no sample taken yet
    D005_RECALIBRATION_REQUESTED,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::D001_CALIBRATING => "D001_CALIBRATING",
            Self::D002_CALIBRATION_COMPLETE => "D002_CALIBRATION_COMPLETE",
            Self::D003_CLASS_MAINTAINED => "D003_CLASS_MAINTAINED",
            Self::D004_CLASS_CHANGED => "D004_CLASS_CHANGED",
            Self::D005_RECALIBRATION_REQUESTED => "D005_RECALIBRATION_REQUESTED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::D001_CALIBRATING => "Accumulating calibration samples",
            Self::D002_CALIBRATION_COMPLETE => "Baseline seeded",
            Self::D003_CLASS_MAINTAINED => "Class unchanged",
            Self::D004_CLASS_CHANGED => "Class changed",
            Self::D005_RECALIBRATION_REQUESTED => "Recalibration requested",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
