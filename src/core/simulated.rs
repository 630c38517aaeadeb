//! Simulated radio for demo runs without hardware
//!
//! Each band reads as a base level plus uniform variation and a smaller
//! jitter term. Randomness comes from a seeded SHA-256 counter stream so a
//! given seed always replays the same session.

use sha2::{Digest, Sha256};

use crate::core::hal::RadioHal;
use crate::types::Band;

/// Deterministic entropy stream: SHA-256(seed ‖ counter)
#[derive(Debug, Clone)]
pub struct EntropyPool {
    seed: [u8; 32],
    counter: u64,
    block: [u8; 32],
    offset: usize,
}

impl EntropyPool {
    /// Create a pool from arbitrary seed bytes
    pub fn new(seed: &[u8]) -> Self {
        let seed: [u8; 32] = Sha256::digest(seed).into();
        Self {
            seed,
            counter: 0,
            block: [0u8; 32],
            offset: 32,
        }
    }

    /// Create a pool from a numeric seed
    pub fn from_u64(seed: u64) -> Self {
        Self::new(&seed.to_le_bytes())
    }

    fn refill(&mut self) {
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(self.counter.to_le_bytes());
        self.block = hasher.finalize().into();
        self.counter += 1;
        self.offset = 0;
    }

    /// Next 64 random bits
    pub fn next_u64(&mut self) -> u64 {
        if self.offset + 8 > self.block.len() {
            self.refill();
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.block[self.offset..self.offset + 8]);
        self.offset += 8;
        u64::from_le_bytes(bytes)
    }

    /// Uniform in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in [-half_width, half_width)
    pub fn symmetric(&mut self, half_width: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * half_width
    }
}

/// Noise profile of one band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandProfile {
    /// Mean level (dBm)
    pub base_dbm: f64,
    /// Half-width of the uniform variation (dB)
    pub variation_db: f64,
    /// Half-width of the jitter term (dB)
    pub jitter_db: f64,
}

impl BandProfile {
    /// Profile observed on a quiet bench for each band
    pub fn bench(band: Band) -> Self {
        match band {
            Band::Lf => Self { base_dbm: -99.4, variation_db: 4.0, jitter_db: 0.75 },
            Band::Hf => Self { base_dbm: -96.1, variation_db: 3.0, jitter_db: 0.6 },
            Band::Uhf => Self { base_dbm: -112.8, variation_db: 5.0, jitter_db: 1.0 },
        }
    }
}

/// Entropy-driven stand-in for the radio front end
#[derive(Debug, Clone)]
pub struct SimulatedRadio {
    entropy: EntropyPool,
    profiles: [BandProfile; 3],
    voltage: f64,
    reads: u64,
}

impl SimulatedRadio {
    /// Bench profiles with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            entropy: EntropyPool::from_u64(seed),
            profiles: Band::ALL.map(BandProfile::bench),
            voltage: 4.15,
            reads: 0,
        }
    }

    /// Replace one band's profile
    pub fn with_profile(mut self, band: Band, profile: BandProfile) -> Self {
        self.profiles[band.index()] = profile;
        self
    }

    /// Shift one band's base level, e.g. to stage a jump event
    pub fn shift_band(&mut self, band: Band, delta_db: f64) {
        self.profiles[band.index()].base_dbm += delta_db;
    }

    /// Profile currently used for `band`
    pub fn profile(&self, band: Band) -> BandProfile {
        self.profiles[band.index()]
    }
}

impl RadioHal for SimulatedRadio {
    fn rssi(&mut self, frequency_hz: u32) -> f64 {
        let Some(band) = Band::from_frequency(frequency_hz) else {
            return f64::NAN;
        };
        self.reads += 1;
        let p = self.profiles[band.index()];
        p.base_dbm + self.entropy.symmetric(p.variation_db) + self.entropy.symmetric(p.jitter_db)
    }

    fn battery_voltage(&mut self) -> f64 {
        // ~1 mV per 3000 reads
        self.voltage - self.reads as f64 * 3.3e-7 + self.entropy.symmetric(0.002)
    }

    fn battery_current(&mut self) -> f64 {
        -118.0 + self.entropy.symmetric(6.0)
    }

    fn die_temperature(&mut self) -> f64 {
        28.5 + self.entropy.symmetric(0.4)
    }
}
