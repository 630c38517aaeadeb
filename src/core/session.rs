//! Clock Session: the single owned record driven by the tick loop
//!
//! Per tick, in order:
//! 1. HAL reads (LF, HF, UHF)
//! 2. Buffer insertions
//! 3. Averages recomputed
//! 4. Φ recomputed
//! 5. EMAs updated (RUNNING only)
//! 6. Metrics and class produced
//!
//! No step can fail; numeric guards return neutral values instead.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::ClockConfig;
use crate::core::calibrator::Calibrator;
use crate::core::classifier::{Classifier, StabilityMetrics, Thresholds};
use crate::core::hal::RadioHal;
use crate::core::phi::{PhiEngine, PhiState};
use crate::core::sampler::Sampler;
use crate::error::ClockResult;
use crate::types::{DimensionStatus, InputEvent, InputKey, ReasonCode, StatusReport};

/// What the loop should do after an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionControl {
    /// Nothing changed (Release events)
    Ignored,
    /// Calibration was reset
    Recalibrated,
    /// Screen navigation, handled by the renderer
    Navigate(InputKey),
    /// Run flag cleared
    Stop,
}

/// All pipeline state for one run of the clock
#[derive(Debug)]
pub struct ClockSession {
    config: ClockConfig,
    sampler: Sampler,
    phi: PhiEngine,
    calibrator: Calibrator,
    classifier: Classifier,
    metrics: Option<StabilityMetrics>,
    status: DimensionStatus,
    reason: ReasonCode,
    started: Instant,
}

impl Default for ClockSession {
    fn default() -> Self {
        Self::from_valid(ClockConfig::default())
    }
}

impl ClockSession {
    /// Create a session in CALIBRATING; rejects a config that fails `validate()`
    pub fn new(config: ClockConfig) -> ClockResult<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: ClockConfig) -> Self {
        let classifier = Classifier::new(Thresholds {
            home: config.home_threshold,
            stable: config.stable_threshold,
            unstable: config.unstable_threshold,
        });
        Self {
            sampler: Sampler::new(),
            phi: PhiEngine::with_rates(config.alpha_slow, config.alpha_fast),
            calibrator: Calibrator::new(config.calibration_samples),
            classifier,
            metrics: None,
            status: DimensionStatus::Calibrating,
            reason: ReasonCode::D001_CALIBRATING,
            started: Instant::now(),
            config,
        }
    }

    /// Run one sample-and-classify step
    pub fn tick<H: RadioHal + ?Sized>(&mut self, hal: &mut H) -> StatusReport {
        let bands = self.sampler.sample(hal);
        let (lf, hf, uhf) = bands.averages();
        self.phi.observe(lf, hf, uhf);

        let mut seeded = false;
        if self.calibrator.is_calibrated() {
            self.phi.update_emas();
        } else if self.calibrator.check(self.sampler.fill()) {
            self.phi.seed();
            seeded = true;
            info!(
                phi = self.phi.state().phi_current,
                samples = self.sampler.fill(),
                "calibration complete"
            );
        }

        if self.calibrator.is_calibrated() {
            let state = self.phi.state();
            let metrics = StabilityMetrics::compute(state.phi_current, state.phi_baseline);
            let status = self.classifier.classify(metrics.stability);

            self.reason = if seeded {
                ReasonCode::D002_CALIBRATION_COMPLETE
            } else if status == self.status {
                ReasonCode::D003_CLASS_MAINTAINED
            } else {
                info!(from = %self.status, to = %status, stability = metrics.stability, "class changed");
                ReasonCode::D004_CLASS_CHANGED
            };
            self.status = status;
            self.metrics = Some(metrics);
        } else {
            self.status = DimensionStatus::Calibrating;
            self.reason = ReasonCode::D001_CALIBRATING;
            self.metrics = None;
        }

        debug!(
            n = self.sampler.total_samples(),
            phi = self.phi.state().phi_current,
            status = %self.status,
            "tick"
        );

        self.current_report()
    }

    /// Report for the current state without sampling
    pub fn current_report(&self) -> StatusReport {
        let phi = self.phi.state();
        let fill = self.sampler.fill();
        StatusReport {
            timestamp: Utc::now(),
            uptime_ms: self.started.elapsed().as_millis() as u64,
            status: self.status,
            reason: self.reason,
            calibration_progress: self.calibrator.progress(fill),
            phi_current: phi.phi_current,
            phi_baseline: phi.phi_baseline,
            phi_short_term: phi.phi_short_term,
            stability: self.metrics.map(|m| m.stability),
            match_percent: self.metrics.map(|m| m.match_percent),
            tracking_error: self.metrics.map(|m| m.tracking_error),
            bands: self.sampler.snapshot(),
            buffer_fill: fill,
            total_samples: self.sampler.total_samples(),
            telemetry: self.sampler.telemetry(),
        }
    }

    /// Discard windows, baselines and metrics; back to CALIBRATING
    pub fn recalibrate(&mut self) {
        self.sampler.reset();
        self.phi.reset();
        self.calibrator.reset();
        self.metrics = None;
        self.status = DimensionStatus::Calibrating;
        self.reason = ReasonCode::D005_RECALIBRATION_REQUESTED;
        info!("recalibration requested");
    }

    /// Apply a front-panel event
    pub fn handle_input(&mut self, event: InputEvent) -> SessionControl {
        if !event.is_actionable() {
            return SessionControl::Ignored;
        }
        match event.key {
            InputKey::Ok => {
                self.recalibrate();
                SessionControl::Recalibrated
            }
            InputKey::Back => SessionControl::Stop,
            key => SessionControl::Navigate(key),
        }
    }

    /// Wait between ticks: fast while calibrating
    pub fn sample_interval(&self) -> std::time::Duration {
        self.config.sample_interval(self.is_calibrated())
    }

    /// Has the baseline been seeded?
    pub fn is_calibrated(&self) -> bool {
        self.calibrator.is_calibrated()
    }

    /// Current class
    pub fn status(&self) -> DimensionStatus {
        self.status
    }

    /// Φ and its EMAs
    pub fn phi_state(&self) -> PhiState {
        self.phi.state()
    }

    /// Metrics from the last running tick
    pub fn metrics(&self) -> Option<StabilityMetrics> {
        self.metrics
    }

    /// Band windows and counters
    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// Active configuration
    pub fn config(&self) -> &ClockConfig {
        &self.config
    }
}

// =============================================================================
// TESTS
// =============================================================================
