//! Dimensional status definitions

use colored::Color;
use serde::{Deserialize, Serialize};

/// The five possible classifications of a clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionStatus {
    /// stability >= 98, baseline tracks Φ closely
    Home,
    /// stability >= 95
    Stable,
    /// stability >= 90, drift detected
    Unstable,
    /// stability < 90, untrackable jump
    Foreign,
    /// Baseline not seeded yet
    Calibrating,
}

impl DimensionStatus {
    /// Terminal color for this status
    pub fn color(&self) -> Color {
        match self {
            DimensionStatus::Home => Color::Green,
            DimensionStatus::Stable => Color::Cyan,
            DimensionStatus::Unstable => Color::Yellow,
            DimensionStatus::Foreign => Color::Red,
            DimensionStatus::Calibrating => Color::BrightBlack,
        }
    }

    /// Front-panel banner text
    pub fn banner(&self) -> &'static str {
        match self {
            DimensionStatus::Home => "[ HOME DIMENSION ]",
            DimensionStatus::Stable => "[ STABLE ]",
            DimensionStatus::Unstable => "[ DRIFT DETECTED ]",
            DimensionStatus::Foreign => "[ FOREIGN DIMENSION ]",
            DimensionStatus::Calibrating => "[ SCANNING... ]",
        }
    }

    /// Is this one of the four ladder classes (not CALIBRATING)?
    pub fn is_classified(&self) -> bool {
        !matches!(self, DimensionStatus::Calibrating)
    }
}

impl std::fmt::Display for DimensionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DimensionStatus::Home => "HOME",
            DimensionStatus::Stable => "STABLE",
            DimensionStatus::Unstable => "UNSTABLE",
            DimensionStatus::Foreign => "FOREIGN",
            DimensionStatus::Calibrating => "CALIBRATING",
        };
        write!(f, "{}", name)
    }
}
