//! Runner: the cooperative tick loop
//!
//! One task owns the session. The only suspension point is the bounded wait
//! on the input queue, whose timeout is the current sample interval, so the
//! sampling cadence is implicit in that wait. Input producers only hold the
//! queue's `Sender`.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::core::hal::RadioHal;
use crate::core::session::{ClockSession, SessionControl};
use crate::core::sink::ReportSink;
use crate::types::{DimensionStatus, InputEvent, InputKey};
use crate::INPUT_QUEUE_SIZE;

/// Create the bounded input queue
pub fn input_queue() -> (mpsc::Sender<InputEvent>, mpsc::Receiver<InputEvent>) {
    mpsc::channel(INPUT_QUEUE_SIZE)
}

/// Press Back once `signal` resolves
///
/// The task owns a strong `Sender`, so the queue stays open and the press
/// is delivered even after every other producer has gone away.
pub fn cancel_on<F>(tx: mpsc::Sender<InputEvent>, signal: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        signal.await;
        if tx.send(InputEvent::press(InputKey::Back)).await.is_err() {
            debug!("input queue closed before cancel");
        }
    })
}

/// Loop limits
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
    /// Stop when every input producer has gone away
    pub stop_when_input_closed: bool,
}

/// Why the loop exited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopReason {
    /// Back pressed
    UserCancel,
    /// `max_ticks` reached
    TickLimit,
    /// Input queue closed
    InputClosed,
}

/// Outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Ticks executed
    pub ticks: u64,
    /// Samples since the last recalibration
    pub total_samples: u64,
    /// Class at exit
    pub final_status: DimensionStatus,
    /// Exit cause
    pub stop_reason: StopReason,
}

/// Apply one event; true when the run flag clears
fn apply<S: ReportSink + ?Sized>(session: &mut ClockSession, sink: &mut S, event: InputEvent) -> bool {
    match session.handle_input(event) {
        SessionControl::Stop => true,
        SessionControl::Navigate(key) => {
            sink.navigate(key);
            false
        }
        SessionControl::Recalibrated | SessionControl::Ignored => false,
    }
}

/// Drive the session until cancelled
pub async fn run_clock<H, S>(
    session: &mut ClockSession,
    hal: &mut H,
    sink: &mut S,
    input: &mut mpsc::Receiver<InputEvent>,
    options: RunOptions,
) -> RunSummary
where
    H: RadioHal + ?Sized,
    S: ReportSink + ?Sized,
{
    hal.acquire();
    info!(calibration_samples = session.config().calibration_samples, "session started");

    let mut ticks = 0u64;
    let mut input_open = true;

    let stop_reason = 'run: loop {
        let report = session.tick(hal);
        hal.idle();
        sink.publish(&report);
        ticks += 1;

        if options.max_ticks.is_some_and(|max| ticks >= max) {
            break StopReason::TickLimit;
        }

        let interval = session.sample_interval();
        if !input_open {
            tokio::time::sleep(interval).await;
            continue;
        }

        match timeout(interval, input.recv()).await {
            Ok(Some(event)) => {
                if apply(session, sink, event) {
                    break StopReason::UserCancel;
                }
                loop {
                    match input.try_recv() {
                        Ok(event) => {
                            if apply(session, sink, event) {
                                break 'run StopReason::UserCancel;
                            }
                        }
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            input_open = false;
                            break;
                        }
                    }
                }
            }
            Ok(None) => {
                input_open = false;
                if options.stop_when_input_closed {
                    break StopReason::InputClosed;
                }
            }
            Err(_) => {}
        }
    };

    hal.release();
    sink.finish();

    let summary = RunSummary {
        ticks,
        total_samples: session.sampler().total_samples(),
        final_status: session.status(),
        stop_reason,
    };
    info!(ticks, status = %summary.final_status, reason = ?stop_reason, "session stopped");
    summary
}

// =============================================================================
// TESTS
// =============================================================================
