//! Integration tests for the tick loop, session log and replay
//!
//! The runner tests use tokio's paused clock, so cadence is checked in
//! virtual time.

use std::time::Duration;

use dimclock::core::{
    analyze_log, cancel_on, feed_keypad, input_queue, read_log, run_clock, ClockSession, CsvLogger, MemorySink,
    ReplayRadio, ReportSink, RunOptions, ScriptedRadio, SimulatedRadio, StopReason,
};
use dimclock::types::{Band, DimensionStatus, InputEvent, InputKey, StatusReport};
use dimclock::ClockConfig;

/// Keeps reports in memory and writes the CSV log at the same time
struct Recorder {
    memory: MemorySink,
    csv: CsvLogger<Vec<u8>>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            memory: MemorySink::new(),
            csv: CsvLogger::new(Vec::new()).unwrap(),
        }
    }
}

impl ReportSink for Recorder {
    fn publish(&mut self, report: &StatusReport) {
        self.memory.publish(report);
        self.csv.publish(report);
    }

    fn navigate(&mut self, key: InputKey) {
        self.memory.navigate(key);
    }
}

/// Deterministic readings with a small repeating ripple
fn stepped_radio() -> ScriptedRadio {
    ScriptedRadio::new(|band, tick| {
        let step = (tick % 7) as f64 * 0.25;
        match band {
            Band::Lf => -99.5 + step,
            Band::Hf => -96.0 - step,
            Band::Uhf => -112.75,
        }
    })
}

#[tokio::test(start_paused = true)]
async fn test_cadence_follows_calibration() {
    let mut session = ClockSession::default();
    let mut radio = SimulatedRadio::new(42);
    let mut sink = MemorySink::new();
    let (_tx, mut rx) = input_queue();

    let start = tokio::time::Instant::now();
    let summary = run_clock(
        &mut session,
        &mut radio,
        &mut sink,
        &mut rx,
        RunOptions { max_ticks: Some(250), ..Default::default() },
    )
    .await;

    assert_eq!(summary.ticks, 250);
    assert_eq!(summary.stop_reason, StopReason::TickLimit);
    // 99 waits at 200 ms, then 150 waits at 1 s
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(169_800), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(171), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_producer_task_drives_session() {
    let mut session = ClockSession::default();
    let mut radio = stepped_radio();
    let mut sink = Recorder::new();
    let (tx, mut rx) = input_queue();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        tx.send(InputEvent::press(InputKey::Right)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(40)).await;
        tx.send(InputEvent::press(InputKey::Ok)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        tx.send(InputEvent::press(InputKey::Back)).await.unwrap();
    });

    let summary = run_clock(&mut session, &mut radio, &mut sink, &mut rx, RunOptions::default()).await;

    assert_eq!(summary.stop_reason, StopReason::UserCancel);
    assert_eq!(sink.memory.keys(), &[InputKey::Right]);

    let reports: Vec<&StatusReport> = sink.memory.reports().collect();
    let recal = reports
        .windows(2)
        .position(|w| w[0].is_calibrated() && !w[1].is_calibrated())
        .expect("no recalibration observed");
    assert_eq!(reports[recal + 1].buffer_fill, 1);
    assert_eq!(reports[recal + 1].status, DimensionStatus::Calibrating);
}

#[tokio::test(start_paused = true)]
async fn test_log_replay_reproduces_session() {
    let mut session = ClockSession::default();
    let mut radio = SimulatedRadio::new(2024);
    let mut recorder = Recorder::new();
    let (_tx, mut rx) = input_queue();

    run_clock(
        &mut session,
        &mut radio,
        &mut recorder,
        &mut rx,
        RunOptions { max_ticks: Some(250), ..Default::default() },
    )
    .await;

    let path = std::env::temp_dir().join(format!("dimclock_replay_{}.csv", std::process::id()));
    std::fs::write(&path, recorder.csv.into_inner().unwrap()).unwrap();
    let records = read_log(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(records.len(), 250);
    assert_eq!(records.iter().filter(|r| r.is_calibrated()).count(), 151);

    let mut replay_session = ClockSession::default();
    let mut replay = ReplayRadio::new(records).unwrap();
    let mut replayed = MemorySink::new();
    let (_tx, mut rx) = input_queue();
    run_clock(
        &mut replay_session,
        &mut replay,
        &mut replayed,
        &mut rx,
        RunOptions { max_ticks: Some(250), ..Default::default() },
    )
    .await;
    assert!(replay.is_exhausted());

    for (recorded, again) in recorder.memory.reports().zip(replayed.reports()) {
        assert_eq!(recorded.status, again.status);
        assert_eq!(recorded.phi_current, again.phi_current);
        assert_eq!(recorded.phi_baseline, again.phi_baseline);
        assert_eq!(recorded.stability, again.stability);
        assert_eq!(recorded.bands.hf.avg, again.bands.hf.avg);
    }
}

#[tokio::test(start_paused = true)]
async fn test_recorded_log_analysis() {
    let mut session = ClockSession::default();
    let mut radio = stepped_radio();
    let mut recorder = Recorder::new();
    let (_tx, mut rx) = input_queue();

    run_clock(
        &mut session,
        &mut radio,
        &mut recorder,
        &mut rx,
        RunOptions { max_ticks: Some(200), ..Default::default() },
    )
    .await;

    let bytes = recorder.csv.into_inner().unwrap();
    let records = dimclock::core::parse_log(bytes.as_slice()).unwrap();
    let analysis = analyze_log(&records).unwrap();

    assert_eq!(analysis.samples, 101);
    assert_eq!(analysis.skipped_calibrating, 99);
    assert!(analysis.warning.is_some());
    let lf = analysis.bands[0].rssi;
    assert!(lf.min >= -99.5 && lf.max <= -98.0);
    assert!(analysis.recommended.home >= 95.0);
}

#[tokio::test(start_paused = true)]
async fn test_custom_config_cadence() {
    let config = ClockConfig {
        calibration_samples: 10,
        calibrating_interval_ms: 50,
        running_interval_ms: 500,
        ..ClockConfig::default()
    };
    let mut session = ClockSession::new(config).unwrap();
    let mut radio = stepped_radio();
    let mut sink = MemorySink::new();
    let (_tx, mut rx) = input_queue();

    let start = tokio::time::Instant::now();
    run_clock(
        &mut session,
        &mut radio,
        &mut sink,
        &mut rx,
        RunOptions { max_ticks: Some(20), ..Default::default() },
    )
    .await;

    let first_home = sink.reports().position(|r| r.is_calibrated()).unwrap();
    assert_eq!(first_home, 9);
    // 9 waits at 50 ms, 10 at 500 ms
    assert!(start.elapsed() >= Duration::from_millis(5_450));
}

#[tokio::test(start_paused = true)]
async fn test_keypad_eof_ends_session() {
    let mut session = ClockSession::default();
    let mut radio = stepped_radio();
    let mut sink = MemorySink::new();
    let (tx, mut rx) = input_queue();

    // A Ctrl-C listener that never fires keeps the queue open
    cancel_on(tx.clone(), std::future::pending());
    let keypad: &'static [u8] = b"right\nleft\n";
    tokio::spawn(feed_keypad(keypad, tx, true));

    let summary = run_clock(&mut session, &mut radio, &mut sink, &mut rx, RunOptions::default()).await;

    assert_eq!(summary.stop_reason, StopReason::UserCancel);
    assert_eq!(sink.keys(), &[InputKey::Right, InputKey::Left]);
}

#[tokio::test(start_paused = true)]
async fn test_headless_cancel_stops_session() {
    let mut session = ClockSession::default();
    let mut radio = SimulatedRadio::new(5);
    let mut sink = MemorySink::new();
    let (tx, mut rx) = input_queue();

    cancel_on(tx, tokio::time::sleep(Duration::from_secs(30)));

    let summary = run_clock(&mut session, &mut radio, &mut sink, &mut rx, RunOptions::default()).await;

    assert_eq!(summary.stop_reason, StopReason::UserCancel);
    // 99 calibrating waits take 19.8 s, the rest run at 1 s
    assert!(summary.ticks >= 109 && summary.ticks <= 111, "ticks {}", summary.ticks);
}
