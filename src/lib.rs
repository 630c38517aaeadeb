//! Dimension Clock: multi-band RSSI ratio tracker
//!
//! Pipeline: RadioHal → Sampler → PhiEngine → Calibrator/Classifier → StatusReport

pub mod config;
pub mod core;
pub mod error;
pub mod types;

pub use config::ClockConfig;
pub use error::{ClockError, ClockResult};

// =============================================================================
// ROLLING WINDOW
// =============================================================================

/// Window length of each per-band rolling buffer
pub const BUFFER_SIZE: usize = 1000;

/// Samples required before leaving CALIBRATING (20 sec at 5 Hz)
pub const CALIBRATION_SAMPLES: usize = 100;

// =============================================================================
// BANDS
// =============================================================================

/// LF band frequency (Hz)
pub const LF_FREQUENCY_HZ: u32 = 315_000_000;

/// HF band frequency (Hz)
pub const HF_FREQUENCY_HZ: u32 = 433_920_000;

/// UHF band frequency (Hz)
pub const UHF_FREQUENCY_HZ: u32 = 868_350_000;

// =============================================================================
// Φ NORMALIZATION
// =============================================================================

/// Shift applied to RSSI before dB → linear conversion
pub const RSSI_OFFSET_DB: f64 = 120.0;

/// Lower bound of the shifted value (keeps Φ out of subnormal range)
pub const NORMALIZED_FLOOR: f64 = 0.1;

/// HF linear magnitude below which Φ is reported as 0
pub const HF_LINEAR_GUARD: f64 = 1e-3;

/// Baseline below which tracking error is undefined (stability = 100)
pub const BASELINE_GUARD: f64 = 1e-4;

// =============================================================================
// ADAPTIVE BASELINE
// =============================================================================

/// Slow EMA rate ("where you are now")
pub const ALPHA_SLOW: f64 = 0.05;

/// Fast EMA rate (short-term trend)
pub const ALPHA_FAST: f64 = 0.15;

// =============================================================================
// STABILITY LADDER
// =============================================================================

/// stability >= this → HOME
pub const HOME_THRESHOLD: f64 = 98.0;

/// stability >= this → STABLE
pub const STABLE_THRESHOLD: f64 = 95.0;

/// stability >= this → UNSTABLE, below → FOREIGN
pub const UNSTABLE_THRESHOLD: f64 = 90.0;

/// Stability is compressed into [STABILITY_FLOOR, 100]
pub const STABILITY_FLOOR: f64 = 80.0;

/// Stability points lost per unit of tracking error
pub const STABILITY_SLOPE: f64 = 20.0;

// =============================================================================
// CADENCE
// =============================================================================

/// Tick interval while calibrating (5 samples/sec)
pub const SAMPLE_INTERVAL_CALIBRATING_MS: u64 = 200;

/// Tick interval once running (1 sample/sec)
pub const SAMPLE_INTERVAL_RUNNING_MS: u64 = 1000;

/// Capacity of the bounded input queue
pub const INPUT_QUEUE_SIZE: usize = 8;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "2.0.0";
