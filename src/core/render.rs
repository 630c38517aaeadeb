//! Terminal renderer
//!
//! Three front-panel screens (Home, Bands, Details) navigated with
//! Left/Right; Details scrolls with Up/Down. Besides the panel view the
//! renderer can emit one line per tick (colored or parseable) or JSON lines.

use std::io::Write;

use colored::Colorize;
use tracing::warn;

use crate::core::sink::ReportSink;
use crate::types::{Band, InputKey, StatusReport};
use crate::BUFFER_SIZE;

/// Lines visible at once on the Details screen
pub const DETAILS_VISIBLE: usize = 5;

/// Width of the band bars on the Bands screen
const BAR_WIDTH: usize = 24;

/// Front-panel screens, left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Bands,
    Details,
}

impl Screen {
    const ORDER: [Screen; 3] = [Screen::Home, Screen::Bands, Screen::Details];

    fn index(self) -> usize {
        match self {
            Screen::Home => 0,
            Screen::Bands => 1,
            Screen::Details => 2,
        }
    }
}

/// Which screen is up and how far Details is scrolled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    screen: Screen,
    scroll: usize,
}

impl Default for Navigator {
    fn default() -> Self {
        Self { screen: Screen::Home, scroll: 0 }
    }
}

impl Navigator {
    /// Start on Home
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a navigation key; Ok and Back are not navigation
    pub fn apply(&mut self, key: InputKey) {
        let idx = self.screen.index();
        match key {
            InputKey::Left if idx > 0 => {
                self.screen = Screen::ORDER[idx - 1];
                self.scroll = 0;
            }
            InputKey::Right if idx + 1 < Screen::ORDER.len() => {
                self.screen = Screen::ORDER[idx + 1];
                self.scroll = 0;
            }
            InputKey::Up if self.screen == Screen::Details => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            InputKey::Down if self.screen == Screen::Details => {
                if self.scroll + DETAILS_VISIBLE < DETAIL_LINE_COUNT {
                    self.scroll += 1;
                }
            }
            _ => {}
        }
    }

    /// Current screen
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Details scroll offset
    pub fn scroll(&self) -> usize {
        self.scroll
    }
}

const DETAIL_LINE_COUNT: usize = 12;

/// Map averaged dBm onto a 0-100 bar (−80 dBm empty, −30 dBm full)
pub fn db_to_percent(db: f64) -> f64 {
    ((db + 80.0) / 50.0 * 100.0).clamp(0.0, 100.0)
}

fn bar(percent: f64) -> String {
    let filled = ((BAR_WIDTH as f64 * percent) / 100.0) as usize;
    let mut out = "#".repeat(filled);
    out.push_str(&".".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)));
    out
}

/// Home screen: title, then calibration progress or the class banner
pub fn home_screen(report: &StatusReport) -> Vec<String> {
    let mut lines = vec!["REALITY DIMENSION CLOCK".to_string(), String::new()];
    if report.is_calibrated() {
        lines.push("E-137".to_string());
        lines.push(report.status.banner().to_string());
    } else {
        let filled = (report.calibration_progress as usize * BAR_WIDTH) / 100;
        lines.push("CALIBRATING...".to_string());
        lines.push(format!("{}%", report.calibration_progress));
        lines.push(format!("[{}{}]", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled.min(BAR_WIDTH))));
    }
    lines
}

/// Bands screen: averaged level per band, Φ, match and buffer fill
pub fn bands_screen(report: &StatusReport) -> Vec<String> {
    let mut lines = vec!["BAND ANALYSIS".to_string()];
    for band in Band::ALL {
        let avg = report.bands.get(band).avg;
        lines.push(format!("{:<4}{} {:.1}", band.label(), bar(db_to_percent(avg)), avg));
    }
    lines.push(format!("PHI: {:.4}  Match: {}", report.phi_current, report.display_match()));
    lines.push(format!("Buffer: {}/{}", report.buffer_fill, BUFFER_SIZE));
    lines
}

/// All Details lines, unscrolled
pub fn detail_lines(report: &StatusReport) -> Vec<String> {
    let b = &report.bands;
    vec![
        format!("Baseline PHI: {:.4}", report.phi_baseline),
        format!("Current PHI:  {:.4}", report.phi_current),
        format!("Match:        {}", report.display_match()),
        format!("Buffer Size:  {}", report.buffer_fill),
        format!("Total Samples:{}", report.total_samples),
        format!("LF Raw:       {:.2} dB", b.lf.raw),
        format!("HF Raw:       {:.2} dB", b.hf.raw),
        format!("UHF Raw:      {:.2} dB", b.uhf.raw),
        format!("LF Avg:       {:.2} dB", b.lf.avg),
        format!("HF Avg:       {:.2} dB", b.hf.avg),
        format!("UHF Avg:      {:.2} dB", b.uhf.avg),
        format!("Battery:      {:.2}V", report.telemetry.voltage),
    ]
}

/// Details screen at a scroll offset
pub fn details_screen(report: &StatusReport, scroll: usize) -> Vec<String> {
    let all = detail_lines(report);
    let mut lines = vec![format!(
        "DETAILS [{}-{}/{}]",
        scroll + 1,
        (scroll + DETAILS_VISIBLE).min(all.len()),
        all.len()
    )];
    lines.extend(all.into_iter().skip(scroll).take(DETAILS_VISIBLE));
    lines
}

/// How each report is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Current front-panel screen
    Panel,
    /// One colored line per tick
    Terminal,
    /// One key=value line per tick
    Parseable,
    /// One JSON object per tick
    Json,
}

/// Writes reports to a terminal (or any writer)
pub struct TerminalRenderer<W: Write> {
    out: W,
    mode: RenderMode,
    nav: Navigator,
    last: Option<StatusReport>,
    write_failed: bool,
}

impl<W: Write> TerminalRenderer<W> {
    /// Create a renderer
    pub fn new(out: W, mode: RenderMode) -> Self {
        Self {
            out,
            mode,
            nav: Navigator::new(),
            last: None,
            write_failed: false,
        }
    }

    /// Navigation state
    pub fn navigator(&self) -> Navigator {
        self.nav
    }

    /// Underlying writer
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Text for one report in the current mode
    pub fn render(&self, report: &StatusReport) -> String {
        match self.mode {
            RenderMode::Panel => {
                let lines = match self.nav.screen() {
                    Screen::Home => home_screen(report),
                    Screen::Bands => bands_screen(report),
                    Screen::Details => details_screen(report, self.nav.scroll()),
                };
                let body = lines.join("\n");
                format!("{}\n", body.color(report.status.color()))
            }
            RenderMode::Terminal => format!("{}\n", report.to_terminal_string()),
            RenderMode::Parseable => format!("{}\n", report.to_parseable_string()),
            RenderMode::Json => match serde_json::to_string(report) {
                Ok(json) => format!("{}\n", json),
                Err(e) => {
                    warn!(error = %e, "report serialization failed");
                    String::new()
                }
            },
        }
    }

    fn write(&mut self, text: &str) {
        let result = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush());
        if let Err(e) = result {
            if !self.write_failed {
                warn!(error = %e, "renderer output failed");
                self.write_failed = true;
            }
        }
    }
}

impl<W: Write> ReportSink for TerminalRenderer<W> {
    fn publish(&mut self, report: &StatusReport) {
        let text = self.render(report);
        self.write(&text);
        self.last = Some(report.clone());
    }

    fn navigate(&mut self, key: InputKey) {
        self.nav.apply(key);
        // Panel mode redraws immediately so navigation does not wait a tick
        if self.mode == RenderMode::Panel {
            if let Some(report) = self.last.take() {
                let text = self.render(&report);
                self.write(&text);
                self.last = Some(report);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
