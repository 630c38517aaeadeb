//! Session log analysis
//!
//! Summarizes a recorded session and suggests class thresholds from the
//! observed Φ spread: HOME within 1σ, STABLE within 2σ, UNSTABLE within 3σ.
//! It also derives front-end constants: per-band base level and 2σ
//! variation, plus the Φ baseline and its 2σ tolerance.
//! Only calibrated rows are used.

use serde::{Deserialize, Serialize};

use crate::core::csv_log::LogRecord;
use crate::error::{ClockError, ClockResult};
use crate::types::Band;

/// Fewer calibrated rows than this makes the recommendation unreliable
pub const MIN_RELIABLE_SAMPLES: usize = 300;

/// Floors applied to the recommended thresholds
const HOME_FLOOR: f64 = 95.0;
const STABLE_FLOOR: f64 = 85.0;
const UNSTABLE_FLOOR: f64 = 70.0;

/// Mean, sample standard deviation and range of one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesStats {
    /// Stats over a non-empty series; `std_dev` is 0 for a single value
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std_dev = if values.len() > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self { mean, std_dev, min, max })
    }

    /// σ/μ as a percentage, 0 when μ is 0
    pub fn variation_percent(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.std_dev / self.mean * 100.0
        }
    }
}

/// Per-band RSSI summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandStats {
    pub band: Band,
    pub rssi: SeriesStats,
}

/// Suggested class boundaries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendedThresholds {
    pub home: f64,
    pub stable: f64,
    pub unstable: f64,
}

impl RecommendedThresholds {
    /// Thresholds from the Φ spread, with floors
    pub fn from_phi(phi: &SeriesStats) -> Self {
        let cv = phi.variation_percent();
        Self {
            home: (100.0 - cv).max(HOME_FLOOR),
            stable: (100.0 - 2.0 * cv).max(STABLE_FLOOR),
            unstable: (100.0 - 3.0 * cv).max(UNSTABLE_FLOOR),
        }
    }
}

/// Base level and 2σ variation observed on one band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandBaseline {
    pub band: Band,
    pub base_dbm: f64,
    pub variation_db: f64,
}

/// Constants to seed a front end with the recorded environment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendedBaseline {
    pub bands: [BandBaseline; 3],
    pub phi_baseline: f64,
    /// 2σ of Φ
    pub phi_tolerance: f64,
}

impl RecommendedBaseline {
    pub fn from_stats(bands: &[BandStats; 3], phi: &SeriesStats) -> Self {
        Self {
            bands: bands.map(|b| BandBaseline {
                band: b.band,
                base_dbm: b.rssi.mean,
                variation_db: 2.0 * b.rssi.std_dev,
            }),
            phi_baseline: phi.mean,
            phi_tolerance: 2.0 * phi.std_dev,
        }
    }
}

/// Full analysis of a session log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogAnalysis {
    /// Calibrated rows analyzed
    pub samples: usize,
    /// Rows skipped because they were written while calibrating
    pub skipped_calibrating: usize,
    /// Span of the analyzed rows in seconds
    pub duration_secs: f64,
    pub bands: [BandStats; 3],
    pub temperature: SeriesStats,
    pub voltage_mean: f64,
    pub phi: SeriesStats,
    pub recommended: RecommendedThresholds,
    pub baseline: RecommendedBaseline,
    /// Set when there are too few samples to trust the recommendation
    pub warning: Option<String>,
}

fn stats(rows: &[&LogRecord], column: impl Fn(&LogRecord) -> f64) -> ClockResult<SeriesStats> {
    let values: Vec<f64> = rows.iter().map(|r| column(r)).collect();
    SeriesStats::from_values(&values).ok_or(ClockError::EmptyLog)
}

/// Analyze the calibrated rows of a session log
pub fn analyze_log(records: &[LogRecord]) -> ClockResult<LogAnalysis> {
    let rows: Vec<&LogRecord> = records.iter().filter(|r| r.is_calibrated()).collect();
    if rows.is_empty() {
        return Err(ClockError::EmptyLog);
    }

    let bands = [
        BandStats { band: Band::Lf, rssi: stats(&rows, |r| r.rssi(Band::Lf))? },
        BandStats { band: Band::Hf, rssi: stats(&rows, |r| r.rssi(Band::Hf))? },
        BandStats { band: Band::Uhf, rssi: stats(&rows, |r| r.rssi(Band::Uhf))? },
    ];
    let temperature = stats(&rows, |r| r.temperature)?;
    let voltage_mean = stats(&rows, |r| r.voltage)?.mean;
    let phi = stats(&rows, |r| r.phi_current)?;

    let first = rows[0].timestamp_ms;
    let last = rows[rows.len() - 1].timestamp_ms;
    let duration_secs = last.saturating_sub(first) as f64 / 1000.0;

    let warning = (rows.len() < MIN_RELIABLE_SAMPLES).then(|| {
        format!(
            "only {} calibrated samples; collect at least {} for reliable thresholds",
            rows.len(),
            MIN_RELIABLE_SAMPLES
        )
    });

    Ok(LogAnalysis {
        samples: rows.len(),
        skipped_calibrating: records.len() - rows.len(),
        duration_secs,
        bands,
        temperature,
        voltage_mean,
        phi,
        recommended: RecommendedThresholds::from_phi(&phi),
        baseline: RecommendedBaseline::from_stats(&bands, &phi),
        warning,
    })
}

impl LogAnalysis {
    /// Human-readable report
    pub fn to_report_string(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Samples:     {} ({} calibrating rows skipped)\n", self.samples, self.skipped_calibrating));
        out.push_str(&format!("Duration:    {:.0} s ({:.1} min)\n\n", self.duration_secs, self.duration_secs / 60.0));
        out.push_str("RSSI (dBm)\n");
        for b in &self.bands {
            out.push_str(&format!(
                "  {:<4} avg {:7.2}  std {:5.2}  range [{:.1}, {:.1}]\n",
                b.band.label(),
                b.rssi.mean,
                b.rssi.std_dev,
                b.rssi.min,
                b.rssi.max
            ));
        }
        out.push_str(&format!(
            "\nTemperature: avg {:.1} °C  std {:.2} °C\n",
            self.temperature.mean, self.temperature.std_dev
        ));
        out.push_str(&format!("Battery:     avg {:.3} V\n\n", self.voltage_mean));
        out.push_str(&format!(
            "PHI avg {:.6}  std {:.6}  range [{:.6}, {:.6}]  variation {:.2}%\n\n",
            self.phi.mean,
            self.phi.std_dev,
            self.phi.min,
            self.phi.max,
            self.phi.variation_percent()
        ));
        out.push_str(&format!(
            "Recommended thresholds: home {:.1}  stable {:.1}  unstable {:.1}\n",
            self.recommended.home, self.recommended.stable, self.recommended.unstable
        ));
        out.push_str("Recommended baseline:\n");
        for b in &self.baseline.bands {
            out.push_str(&format!(
                "  {:<4} base {:.1} dBm  variation {:.1} dB (2σ)\n",
                b.band.label(),
                b.base_dbm,
                b.variation_db
            ));
        }
        out.push_str(&format!(
            "  PHI  baseline {:.6}  tolerance {:.6} (2σ)\n",
            self.baseline.phi_baseline, self.baseline.phi_tolerance
        ));
        if let Some(warning) = &self.warning {
            out.push_str(&format!("WARNING: {}\n", warning));
        }
        out
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(n: u64, phi: f64, calibrated: bool) -> LogRecord {
        LogRecord {
            timestamp_ms: n * 1000,
            sample_num: n,
            rssi_315: -99.0 - (n % 2) as f64,
            rssi_433: -96.0,
            rssi_868: -113.0,
            temperature: 28.0,
            voltage: 4.1,
            phi_current: phi,
            phi_baseline: phi,
            phi_short: phi,
            stability: calibrated.then_some(100.0),
            match_pct: calibrated.then_some(100.0),
        }
    }

    #[test]
    fn test_series_stats() {
        let s = SeriesStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((s.mean - 5.0).abs() < 1e-12);
        // Sample (n − 1) standard deviation
        assert!((s.std_dev - 2.138089935).abs() < 1e-6);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);

        let one = SeriesStats::from_values(&[3.0]).unwrap();
        assert_eq!(one.std_dev, 0.0);
        assert!(SeriesStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_skips_calibrating_rows() {
        let mut records: Vec<LogRecord> = (0..10).map(|n| row(n, 0.5, false)).collect();
        records.extend((10..20).map(|n| row(n, 0.1, true)));
        let analysis = analyze_log(&records).unwrap();
        assert_eq!(analysis.samples, 10);
        assert_eq!(analysis.skipped_calibrating, 10);
        assert!((analysis.phi.mean - 0.1).abs() < 1e-12);
        assert!((analysis.duration_secs - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_steady_phi_gives_floor_free_thresholds() {
        let records: Vec<LogRecord> = (0..400).map(|n| row(n, 0.1, true)).collect();
        let analysis = analyze_log(&records).unwrap();
        assert!((analysis.recommended.home - 100.0).abs() < 1e-9);
        assert!((analysis.recommended.stable - 100.0).abs() < 1e-9);
        assert!((analysis.recommended.unstable - 100.0).abs() < 1e-9);
        assert!(analysis.warning.is_none());
    }

    #[test]
    fn test_noisy_phi_hits_floors() {
        let records: Vec<LogRecord> = (0..50)
            .map(|n| row(n, if n % 2 == 0 { 0.05 } else { 0.15 }, true))
            .collect();
        let analysis = analyze_log(&records).unwrap();
        // σ/μ ≈ 50%
        assert_eq!(analysis.recommended.home, 95.0);
        assert_eq!(analysis.recommended.stable, 85.0);
        assert_eq!(analysis.recommended.unstable, 70.0);
        assert!(analysis.warning.is_some());
    }

    #[test]
    fn test_recommended_baseline() {
        let records: Vec<LogRecord> = (0..50)
            .map(|n| row(n, if n % 2 == 0 { 0.05 } else { 0.15 }, true))
            .collect();
        let analysis = analyze_log(&records).unwrap();
        let lf = analysis.baseline.bands[0];
        assert_eq!(lf.band, Band::Lf);
        assert!((lf.base_dbm + 99.5).abs() < 1e-9);
        assert!((lf.variation_db - 2.0 * analysis.bands[0].rssi.std_dev).abs() < 1e-12);
        // Constant bands have no spread
        assert_eq!(analysis.baseline.bands[1].variation_db, 0.0);
        assert!((analysis.baseline.phi_baseline - 0.1).abs() < 1e-12);
        assert!((analysis.baseline.phi_tolerance - 2.0 * analysis.phi.std_dev).abs() < 1e-12);
    }

    #[test]
    fn test_only_calibrating_rows_is_empty() {
        let records: Vec<LogRecord> = (0..5).map(|n| row(n, 0.1, false)).collect();
        assert!(matches!(analyze_log(&records), Err(ClockError::EmptyLog)));
    }

    #[test]
    fn test_report_string() {
        let records: Vec<LogRecord> = (0..20).map(|n| row(n, 0.1, true)).collect();
        let text = analyze_log(&records).unwrap().to_report_string();
        assert!(text.contains("Recommended thresholds"));
        assert!(text.contains("Recommended baseline"));
        assert!(text.contains("PHI  baseline 0.100000  tolerance 0.000000"));
        assert!(text.contains("WARNING"));
    }
}
