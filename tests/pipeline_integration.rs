//! Integration tests for the sampling pipeline
//!
//! End-to-end scenarios on a scripted radio, plus the invariants that must
//! hold for any input stream.

use dimclock::core::{calculate_phi, ClockSession, RollingBuffer, ScriptedRadio, SimulatedRadio};
use dimclock::core::phi::phi_from_linear;
use dimclock::types::{Band, DimensionStatus, InputEvent, InputKey, ReasonCode, StatusReport};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

const LF: f64 = -99.4;
const HF: f64 = -96.1;
const UHF: f64 = -112.8;

fn steady_radio() -> ScriptedRadio {
    ScriptedRadio::constant(LF, HF, UHF)
}

fn run(session: &mut ClockSession, radio: &mut ScriptedRadio, ticks: usize) -> Vec<StatusReport> {
    (0..ticks).map(|_| session.tick(radio)).collect()
}

fn assert_finite(report: &StatusReport) {
    let values = [
        report.phi_current,
        report.phi_baseline,
        report.phi_short_term,
        report.bands.lf.avg,
        report.bands.hf.avg,
        report.bands.uhf.avg,
    ];
    for v in values {
        assert!(v.is_finite(), "non-finite value in report: {:?}", report);
    }
    for v in [report.stability, report.match_percent, report.tracking_error].into_iter().flatten() {
        assert!(v.is_finite());
    }
}

#[test]
fn test_steady_state() {
    let mut session = ClockSession::default();
    let mut radio = steady_radio();
    let reports = run(&mut session, &mut radio, 200);

    for (i, report) in reports.iter().take(99).enumerate() {
        assert_eq!(report.status, DimensionStatus::Calibrating);
        assert_eq!(report.calibration_progress as usize, i + 1);
    }
    assert_eq!(reports[99].status, DimensionStatus::Home);
    assert_eq!(reports[99].reason, ReasonCode::D002_CALIBRATION_COMPLETE);
    for report in &reports[100..] {
        assert_eq!(report.status, DimensionStatus::Home);
        assert_eq!(report.reason, ReasonCode::D003_CLASS_MAINTAINED);
    }

    let last = &reports[199];
    assert!((last.phi_current - 0.1).abs() < 1e-9);
    assert!((last.phi_baseline - last.phi_current).abs() / last.phi_current < 0.01);
}

#[test]
fn test_baseline_drift() {
    let mut session = ClockSession::default();
    let mut radio = ScriptedRadio::new(|band, tick| match band {
        Band::Lf => LF,
        Band::Hf if tick <= 100 => HF,
        Band::Hf => HF + 6.0 * (tick - 100) as f64 / 400.0,
        Band::Uhf => UHF,
    });

    for report in run(&mut session, &mut radio, 500).into_iter().skip(99) {
        let stability = report.stability.unwrap();
        assert!(stability >= 95.0, "stability {} at n={}", stability, report.total_samples);
        assert!(matches!(report.status, DimensionStatus::Home | DimensionStatus::Stable));
    }
}

#[test]
fn test_uhf_jump_is_absorbed_by_window() {
    // The 1000-sample mean spreads a 10 dB step over many ticks, so the
    // class dips to STABLE but never reaches UNSTABLE
    let mut session = ClockSession::default();
    let mut radio = ScriptedRadio::new(|band, tick| match band {
        Band::Lf => LF,
        Band::Hf => HF,
        Band::Uhf if tick <= 100 => UHF,
        Band::Uhf => UHF + 10.0,
    });
    let reports = run(&mut session, &mut radio, 300);
    let running = &reports[100..];

    let min = running.iter().filter_map(|r| r.stability).fold(f64::INFINITY, f64::min);
    assert!(min < 98.0 && min >= 95.0, "min stability {}", min);
    assert!(running.iter().any(|r| r.status == DimensionStatus::Stable));
    assert!(running
        .iter()
        .all(|r| matches!(r.status, DimensionStatus::Home | DimensionStatus::Stable)));

    // Back home once the slow EMA catches up, and stays there
    for report in &reports[170..] {
        assert_eq!(report.status, DimensionStatus::Home);
    }
}

#[test]
fn test_single_lf_spike() {
    let mut session = ClockSession::default();
    let mut radio = ScriptedRadio::new(|band, tick| match band {
        Band::Lf if tick == 500 => LF + 20.0,
        Band::Lf => LF,
        Band::Hf => HF,
        Band::Uhf => UHF,
    });
    let reports = run(&mut session, &mut radio, 700);

    let spike = &reports[499];
    assert!(spike.tracking_error.unwrap() > 0.0);
    for report in &reports[99..] {
        assert_eq!(report.status, DimensionStatus::Home);
    }
}

#[test]
fn test_buffer_wrap_with_spike() {
    let mut buf: RollingBuffer = RollingBuffer::new();
    for _ in 0..999 {
        buf.add(0.0);
    }
    buf.add(1000.0);
    assert!((buf.average() - 1.0).abs() < 1e-9);
    assert_eq!(buf.write_idx(), 0);

    // Overwrites a zero; the 1000.0 is still in the window
    buf.add(-1000.0);
    assert!(buf.average().abs() < 1e-9);

    let mut zeros: RollingBuffer = RollingBuffer::new();
    for _ in 0..1000 {
        zeros.add(0.0);
    }
    zeros.add(-1000.0);
    assert!((zeros.average() + 1.0).abs() < 1e-9);
}

#[test]
fn test_recalibrate_mid_flight() {
    let mut session = ClockSession::default();
    let mut radio = steady_radio();
    run(&mut session, &mut radio, 200);

    session.handle_input(InputEvent::press(InputKey::Ok));
    let pending = session.current_report();
    assert_eq!(pending.buffer_fill, 0);
    assert_eq!(pending.status, DimensionStatus::Calibrating);

    let reports = run(&mut session, &mut radio, 100);
    assert_eq!(reports[0].buffer_fill, 1);
    assert_eq!(reports[0].status, DimensionStatus::Calibrating);
    let first_home = reports.iter().position(|r| r.status == DimensionStatus::Home).unwrap();
    // Tick 300 overall
    assert_eq!(first_home, 99);
}

#[test]
fn test_phi_guard() {
    assert_eq!(phi_from_linear(1.0, 1e-4, 1.0), 0.0);
    assert_eq!(phi_from_linear(1.0, f64::NAN, 1.0), 0.0);
    assert_eq!(phi_from_linear(f64::INFINITY, 1.0, 1.0), 0.0);

    // Extreme readings never leak NaN or Inf into a report
    let mut session = ClockSession::default();
    let mut radio = ScriptedRadio::new(|band, tick| match (band, tick % 4) {
        (Band::Hf, 0) => f64::NAN,
        (Band::Lf, 1) => f64::INFINITY,
        (Band::Uhf, 2) => 5000.0,
        (Band::Hf, 3) => -1e300,
        _ => -100.0,
    });
    for report in run(&mut session, &mut radio, 300) {
        assert_finite(&report);
    }
}

#[test]
fn test_all_floor_readings() {
    assert!((calculate_phi(-120.0, -120.0, -120.0) - 1.0).abs() < 1e-12);

    let mut session = ClockSession::default();
    let mut radio = ScriptedRadio::constant(-120.0, -120.0, -120.0);
    let last = run(&mut session, &mut radio, 100).pop().unwrap();
    assert!((last.stability.unwrap() - 100.0).abs() < 1e-9);
    assert_eq!(last.status, DimensionStatus::Home);
}

#[test]
fn test_invariants_on_simulated_radio() {
    let mut session = ClockSession::default();
    let mut radio = SimulatedRadio::new(7);
    let mut was_calibrated = false;

    for _ in 0..1500 {
        let report = session.tick(&mut radio);
        for band in Band::ALL {
            assert_eq!(session.sampler().buffer(band).count(), report.buffer_fill);
        }
        assert_eq!(report.status == DimensionStatus::Calibrating, !session.is_calibrated());
        if was_calibrated {
            assert!(session.is_calibrated());
        }
        was_calibrated = session.is_calibrated();

        if let (Some(stability), Some(matched)) = (report.stability, report.match_percent) {
            assert!((80.0..=100.0).contains(&stability));
            assert!((0.0..=100.0).contains(&matched));
        }
        assert_finite(&report);
    }
    assert_eq!(session.sampler().buffer(Band::Lf).count(), 1000);
}

#[test]
fn test_recalibrate_idempotent() {
    let normalize = |mut r: StatusReport| {
        r.timestamp = Utc.timestamp_opt(0, 0).unwrap();
        r.uptime_ms = 0;
        r
    };

    let mut once = ClockSession::default();
    once.recalibrate();
    let mut twice = ClockSession::default();
    twice.recalibrate();
    twice.recalibrate();
    assert_eq!(normalize(once.current_report()), normalize(twice.current_report()));

    let mut r1 = steady_radio();
    let mut r2 = steady_radio();
    assert_eq!(normalize(once.tick(&mut r1)), normalize(twice.tick(&mut r2)));
}

#[test]
fn test_constant_stream_converges() {
    let mut session = ClockSession::default();
    let mut radio = ScriptedRadio::constant(-80.0, -85.0, -90.0);
    let last = run(&mut session, &mut radio, 400).pop().unwrap();
    let phi = session.phi_state();
    assert!((phi.phi_current - phi.phi_baseline).abs() < 1e-9);
    assert!((phi.phi_current - phi.phi_short_term).abs() < 1e-9);
    assert!((last.stability.unwrap() - 100.0).abs() < 1e-9);
    assert_eq!(last.status, DimensionStatus::Home);
}
