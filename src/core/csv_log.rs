//! CSV session log: writer sink, reader, and replay HAL
//!
//! One row per tick. `stability` and `match_pct` are empty while
//! calibrating. Floats are written at full precision, so a replayed log
//! reproduces the recorded Φ exactly.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::hal::RadioHal;
use crate::core::sink::ReportSink;
use crate::error::{ClockError, ClockResult};
use crate::types::{Band, StatusReport, Telemetry};

/// Column names, in row order
pub const CSV_COLUMNS: [&str; 12] = [
    "timestamp_ms",
    "sample_num",
    "rssi_315",
    "rssi_433",
    "rssi_868",
    "temperature",
    "voltage",
    "phi_current",
    "phi_baseline",
    "phi_short",
    "stability",
    "match_pct",
];

/// Header line as written
pub const CSV_HEADER: &str = "timestamp_ms,sample_num,rssi_315,rssi_433,rssi_868,temperature,voltage,phi_current,phi_baseline,phi_short,stability,match_pct";

/// One logged tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp_ms: u64,
    pub sample_num: u64,
    pub rssi_315: f64,
    pub rssi_433: f64,
    pub rssi_868: f64,
    pub temperature: f64,
    pub voltage: f64,
    pub phi_current: f64,
    pub phi_baseline: f64,
    pub phi_short: f64,
    pub stability: Option<f64>,
    pub match_pct: Option<f64>,
}

impl LogRecord {
    /// Row for a report
    pub fn from_report(report: &StatusReport) -> Self {
        Self {
            timestamp_ms: report.uptime_ms,
            sample_num: report.total_samples,
            rssi_315: report.bands.lf.raw,
            rssi_433: report.bands.hf.raw,
            rssi_868: report.bands.uhf.raw,
            temperature: report.telemetry.temperature,
            voltage: report.telemetry.voltage,
            phi_current: report.phi_current,
            phi_baseline: report.phi_baseline,
            phi_short: report.phi_short_term,
            stability: report.stability,
            match_pct: report.match_percent,
        }
    }

    /// Raw RSSI for one band
    pub fn rssi(&self, band: Band) -> f64 {
        match band {
            Band::Lf => self.rssi_315,
            Band::Hf => self.rssi_433,
            Band::Uhf => self.rssi_868,
        }
    }

    /// Was the session calibrated when this row was written?
    pub fn is_calibrated(&self) -> bool {
        self.stability.is_some()
    }
}

/// Map a csv error onto the log error kinds, keeping the line number
fn log_error(err: csv::Error) -> ClockError {
    let line = err.position().map(|p| p.line() as usize).unwrap_or(0);
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => ClockError::Io(e),
        _ => ClockError::LogFormat { line, reason },
    }
}

/// Parse a whole log: header line, then one row per tick
pub fn parse_log(reader: impl Read) -> ClockResult<Vec<LogRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers().map_err(log_error)?;
    if headers.is_empty() {
        return Err(ClockError::EmptyLog);
    }
    if !headers.iter().eq(CSV_COLUMNS) {
        return Err(ClockError::LogFormat {
            line: 1,
            reason: "missing or unexpected header".to_string(),
        });
    }

    let records = rdr
        .deserialize()
        .collect::<Result<Vec<LogRecord>, csv::Error>>()
        .map_err(log_error)?;
    if records.is_empty() {
        return Err(ClockError::EmptyLog);
    }
    Ok(records)
}

/// Read a log file from disk
pub fn read_log(path: impl AsRef<Path>) -> ClockResult<Vec<LogRecord>> {
    let file = File::open(path.as_ref())?;
    let records = parse_log(file)?;
    debug!(path = %path.as_ref().display(), rows = records.len(), "log loaded");
    Ok(records)
}

/// Sink appending one CSV row per report
pub struct CsvLogger<W: Write> {
    out: csv::Writer<W>,
    rows: u64,
    failed: bool,
}

impl CsvLogger<BufWriter<File>> {
    /// Create (or truncate) a log file, creating parent directories
    pub fn create(path: impl AsRef<Path>) -> ClockResult<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        debug!(path = %path.display(), "log opened");
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CsvLogger<W> {
    /// Wrap a writer and emit the header
    pub fn new(out: W) -> ClockResult<Self> {
        // Header goes out up front so a log with no ticks is still readable
        let mut out = csv::WriterBuilder::new().has_headers(false).from_writer(out);
        out.write_record(CSV_COLUMNS).map_err(log_error)?;
        Ok(Self { out, rows: 0, failed: false })
    }

    /// Append one record
    pub fn write_record(&mut self, record: &LogRecord) -> ClockResult<()> {
        self.out.serialize(record).map_err(log_error)?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and return the writer
    pub fn into_inner(self) -> ClockResult<W> {
        self.out.into_inner().map_err(|e| ClockError::Io(e.into_error()))
    }
}

impl<W: Write> ReportSink for CsvLogger<W> {
    fn publish(&mut self, report: &StatusReport) {
        if self.failed {
            return;
        }
        if let Err(e) = self.write_record(&LogRecord::from_report(report)) {
            warn!(error = %e, "log write failed, logging disabled");
            self.failed = true;
        }
    }

    fn finish(&mut self) {
        if let Err(e) = self.out.flush() {
            warn!(error = %e, "log flush failed");
        }
    }
}

/// HAL that plays back the raw readings of a recorded session
///
/// Each LF read starts a new row. Once the rows run out the last one
/// repeats, unless the replay loops.
#[derive(Debug, Clone)]
pub struct ReplayRadio {
    records: Vec<LogRecord>,
    next: usize,
    current: usize,
    looping: bool,
}

impl ReplayRadio {
    /// Replay `records` once; an empty list is an error
    pub fn new(records: Vec<LogRecord>) -> ClockResult<Self> {
        if records.is_empty() {
            return Err(ClockError::EmptyLog);
        }
        Ok(Self { records, next: 0, current: 0, looping: false })
    }

    /// Load and replay a log file
    pub fn from_file(path: impl AsRef<Path>) -> ClockResult<Self> {
        Self::new(read_log(path)?)
    }

    /// Restart from the first row when exhausted
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Rows in the recording
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; construction rejects empty recordings
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Have all rows been played?
    pub fn is_exhausted(&self) -> bool {
        !self.looping && self.next >= self.records.len()
    }

    fn advance(&mut self) {
        if self.next >= self.records.len() {
            if !self.looping {
                return;
            }
            self.next = 0;
        }
        self.current = self.next;
        self.next += 1;
    }

    fn row(&self) -> &LogRecord {
        &self.records[self.current]
    }
}

impl RadioHal for ReplayRadio {
    fn rssi(&mut self, frequency_hz: u32) -> f64 {
        match Band::from_frequency(frequency_hz) {
            Some(Band::Lf) => {
                self.advance();
                self.row().rssi_315
            }
            Some(band) => self.row().rssi(band),
            None => f64::NAN,
        }
    }

    fn battery_voltage(&mut self) -> f64 {
        self.row().voltage
    }

    fn battery_current(&mut self) -> f64 {
        0.0
    }

    fn die_temperature(&mut self) -> f64 {
        self.row().temperature
    }

    fn telemetry(&mut self) -> Telemetry {
        let row = self.row();
        Telemetry {
            voltage: row.voltage,
            current_ma: 0.0,
            temperature: row.temperature,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
