//! Sampler: one acquisition per tick
//!
//! Reads LF, HF, UHF in that order, feeds each band's rolling buffer in
//! lockstep, and exposes raw readings plus window means.

use tracing::warn;

use crate::core::hal::RadioHal;
use crate::core::rolling_buffer::RollingBuffer;
use crate::types::{Band, BandReading, BandSnapshot, Telemetry};
use crate::{NORMALIZED_FLOOR, RSSI_OFFSET_DB};

/// RSSI substituted for a non-finite first reading (normalizes to the floor)
pub const RSSI_FLOOR_DBM: f64 = NORMALIZED_FLOOR - RSSI_OFFSET_DB;

/// Per-band rolling windows plus the latest observations
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    /// One window per band, indexed by `Band::index`
    buffers: [RollingBuffer; 3],
    /// Readings from the last tick
    last: BandSnapshot,
    /// Telemetry from the last tick
    telemetry: Telemetry,
    /// Ticks since creation or reset
    total_samples: u64,
    /// Non-finite readings replaced since creation or reset
    sanitized: u64,
}

impl Sampler {
    /// Create with empty windows
    pub fn new() -> Self {
        Self::default()
    }

    /// Take one reading per band and update the windows
    pub fn sample<H: RadioHal + ?Sized>(&mut self, hal: &mut H) -> BandSnapshot {
        let mut raws = [0.0; 3];
        for band in Band::ALL {
            raws[band.index()] = hal.rssi(band.frequency_hz());
        }

        for band in Band::ALL {
            let i = band.index();
            let previous = if self.total_samples > 0 {
                Some(self.last.get(band).raw)
            } else {
                None
            };
            let raw = self.admit(band, raws[i], previous);
            self.buffers[i].add(raw);
            let reading = BandReading { raw, avg: self.buffers[i].average() };
            match band {
                Band::Lf => self.last.lf = reading,
                Band::Hf => self.last.hf = reading,
                Band::Uhf => self.last.uhf = reading,
            }
        }

        self.telemetry = hal.telemetry();
        self.total_samples += 1;
        self.last
    }

    /// Admit a reading as data; only non-finite values are replaced
    fn admit(&mut self, band: Band, raw: f64, previous: Option<f64>) -> f64 {
        if raw.is_finite() {
            return raw;
        }
        let substitute = previous.unwrap_or(RSSI_FLOOR_DBM);
        self.sanitized += 1;
        warn!(band = %band, raw, substitute, "non-finite RSSI reading replaced");
        substitute
    }

    /// Empty all windows and counters
    pub fn reset(&mut self) {
        for buf in &mut self.buffers {
            buf.reset();
        }
        self.last = BandSnapshot::default();
        self.total_samples = 0;
        self.sanitized = 0;
    }

    /// Window for one band
    pub fn buffer(&self, band: Band) -> &RollingBuffer {
        &self.buffers[band.index()]
    }

    /// Live samples per window (identical across bands)
    pub fn fill(&self) -> usize {
        self.buffers[Band::Lf.index()].count()
    }

    /// Readings from the last tick
    pub fn snapshot(&self) -> BandSnapshot {
        self.last
    }

    /// Telemetry from the last tick
    pub fn telemetry(&self) -> Telemetry {
        self.telemetry
    }

    /// Ticks since creation or reset
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    /// Non-finite readings replaced since creation or reset
    pub fn sanitized(&self) -> u64 {
        self.sanitized
    }
}

// =============================================================================
// TESTS
// =============================================================================
