//! Core modules for the dimension clock

pub mod rolling_buffer;
pub mod hal;
pub mod simulated;
pub mod sampler;
pub mod phi;
pub mod classifier;
pub mod calibrator;
pub mod session;
pub mod sink;
pub mod render;
pub mod runner;
pub mod csv_log;
pub mod analysis;
pub mod keys;
pub mod api;

pub use rolling_buffer::RollingBuffer;
pub use hal::{RadioHal, RadioLifecycle, ScriptedRadio};
pub use simulated::{BandProfile, EntropyPool, SimulatedRadio};
pub use sampler::{Sampler, RSSI_FLOOR_DBM};
pub use phi::{calculate_phi, PhiEngine, PhiState};
pub use classifier::{Classifier, StabilityMetrics, Thresholds};
pub use calibrator::{CalibrationPhase, Calibrator};
pub use session::{ClockSession, SessionControl};
pub use sink::{MemorySink, ReportSink, SinkSet};
pub use render::{Navigator, RenderMode, Screen, TerminalRenderer};
pub use runner::{cancel_on, input_queue, run_clock, RunOptions, RunSummary, StopReason};
pub use csv_log::{parse_log, read_log, CsvLogger, LogRecord, ReplayRadio, CSV_COLUMNS, CSV_HEADER};
pub use analysis::{analyze_log, BandBaseline, LogAnalysis, RecommendedBaseline, RecommendedThresholds, SeriesStats};
pub use keys::{feed_keypad, parse_command};
pub use api::{create_router, run_server, LiveHub};
