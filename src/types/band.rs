//! Frequency bands and per-tick band observations

use serde::{Deserialize, Serialize};

use crate::{HF_FREQUENCY_HZ, LF_FREQUENCY_HZ, UHF_FREQUENCY_HZ};

/// The three sampled bands, in query order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Band {
    /// 315 MHz
    Lf,
    /// 433.92 MHz
    Hf,
    /// 868.35 MHz
    Uhf,
}

impl Band {
    /// All bands in HAL query order
    pub const ALL: [Band; 3] = [Band::Lf, Band::Hf, Band::Uhf];

    /// Center frequency in Hz
    pub fn frequency_hz(&self) -> u32 {
        match self {
            Band::Lf => LF_FREQUENCY_HZ,
            Band::Hf => HF_FREQUENCY_HZ,
            Band::Uhf => UHF_FREQUENCY_HZ,
        }
    }

    /// Band tuned to `frequency_hz`, if any
    pub fn from_frequency(frequency_hz: u32) -> Option<Band> {
        Band::ALL.into_iter().find(|b| b.frequency_hz() == frequency_hz)
    }

    /// Short label for the front panel
    pub fn label(&self) -> &'static str {
        match self {
            Band::Lf => "LF",
            Band::Hf => "HF",
            Band::Uhf => "UHF",
        }
    }

    /// Position in `Band::ALL`
    pub fn index(&self) -> usize {
        match self {
            Band::Lf => 0,
            Band::Hf => 1,
            Band::Uhf => 2,
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One band's readings for a tick (dBm)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandReading {
    /// Value returned by the HAL this tick
    pub raw: f64,
    /// Rolling-window mean after inserting `raw`
    pub avg: f64,
}

/// Readings of all three bands for a tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandSnapshot {
    pub lf: BandReading,
    pub hf: BandReading,
    pub uhf: BandReading,
}

impl BandSnapshot {
    /// Reading for one band
    pub fn get(&self, band: Band) -> BandReading {
        match band {
            Band::Lf => self.lf,
            Band::Hf => self.hf,
            Band::Uhf => self.uhf,
        }
    }

    /// Averages in (LF, HF, UHF) order
    pub fn averages(&self) -> (f64, f64, f64) {
        (self.lf.avg, self.hf.avg, self.uhf.avg)
    }
}

/// Non-critical telemetry read alongside RSSI
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Telemetry {
    /// Battery voltage (V)
    pub voltage: f64,
    /// Battery current (mA), sampled but not consumed by the pipeline
    pub current_ma: f64,
    /// Die temperature (°C)
    pub temperature: f64,
}
