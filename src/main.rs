//! Dimension Clock CLI
//!
//! Usage:
//!   dimclock                                  # Simulated radio, keypad on stdin
//!   dimclock --panel                          # Front-panel screens instead of lines
//!   dimclock --replay session.csv --json      # Replay a recorded session
//!   dimclock --log session.csv --ticks 600    # Record ten minutes
//!   dimclock --serve --addr 127.0.0.1:3000    # HTTP + WebSocket API
//!   dimclock --analyze session.csv            # Summarize a recording

use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dimclock::core::{
    analyze_log, cancel_on, feed_keypad, input_queue, read_log, run_clock, run_server,
    ClockSession, CsvLogger, LiveHub, RadioHal, RenderMode, ReplayRadio, RunOptions,
    SimulatedRadio, SinkSet, TerminalRenderer,
};
use dimclock::{ClockConfig, ClockResult, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "dimclock",
    version = VERSION,
    about = "Dimension Clock - track the LF·UHF/HF² ratio of three RSSI bands",
    long_about = "Samples RSSI at 315, 433.92 and 868.35 MHz, smooths each band over a\n\
                  1000-sample window and classifies how closely the band ratio Φ\n\
                  tracks its adaptive baseline.\n\n\
                  Keys (stdin): up/down/left/right navigate, ok recalibrates,\n\
                  back or q quits. Add 'repeat' or 'release' to send that event type.\n\n\
                  Classes:\n  \
                  HOME      - stability >= 98\n  \
                  STABLE    - stability >= 95\n  \
                  UNSTABLE  - stability >= 90\n  \
                  FOREIGN   - below 90"
)]
struct Args {
    /// Stop after this many ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Output as JSON lines
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Draw the front-panel screens
    #[arg(long)]
    panel: bool,

    /// Seed for the simulated radio
    #[arg(long, default_value_t = 137)]
    seed: u64,

    /// Replay RSSI and telemetry from a session log
    #[arg(long, value_name = "CSV")]
    replay: Option<String>,

    /// Record the session to a CSV log
    #[arg(long, value_name = "CSV")]
    log: Option<String>,

    /// Load tunables from a JSON file
    #[arg(long, value_name = "JSON")]
    config: Option<String>,

    /// Run the HTTP API alongside the clock
    #[arg(short, long)]
    serve: bool,

    /// Server address
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Analyze a session log and exit
    #[arg(long, value_name = "CSV")]
    analyze: Option<String>,

    /// Ignore stdin
    #[arg(long)]
    headless: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(args: &Args) {
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!args.no_color)
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(&args);

    if args.no_color {
        colored::control::set_override(false);
    }

    let result = match args.analyze.as_deref() {
        Some(path) => run_analyze(path, &args),
        None => run_live(&args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Summarize a recorded session
fn run_analyze(path: &str, args: &Args) -> ClockResult<()> {
    let records = read_log(path)?;
    let analysis = analyze_log(&records)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("SENSOR DATA ANALYSIS: {}", path);
        println!("{}", "=".repeat(60));
        print!("{}", analysis.to_report_string());
    }
    Ok(())
}

/// Run the clock against a simulated or replayed radio
async fn run_live(args: &Args) -> ClockResult<()> {
    let config = match args.config.as_deref() {
        Some(path) => ClockConfig::from_file(path)?,
        None => ClockConfig::default(),
    };
    let mut session = ClockSession::new(config)?;

    let mut max_ticks = args.ticks;
    let mut radio: Box<dyn RadioHal + Send> = match args.replay.as_deref() {
        Some(path) => {
            let replay = ReplayRadio::from_file(path)?;
            info!(path, rows = replay.len(), "replaying session log");
            max_ticks = max_ticks.or(Some(replay.len() as u64));
            Box::new(replay)
        }
        None => Box::new(SimulatedRadio::new(args.seed)),
    };

    let mode = if args.json {
        RenderMode::Json
    } else if args.panel {
        RenderMode::Panel
    } else if args.no_color {
        RenderMode::Parseable
    } else {
        RenderMode::Terminal
    };

    let mut sinks = SinkSet::new();
    sinks.push(TerminalRenderer::new(std::io::stdout(), mode));
    if let Some(path) = args.log.as_deref() {
        sinks.push(CsvLogger::create(path)?);
        info!(path, "recording session log");
    }

    let (tx, mut rx) = input_queue();

    if args.serve {
        let hub = LiveHub::new();
        sinks.push(hub.clone());
        let addr = args.addr.clone();
        let api_tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = run_server(&addr, hub, api_tx).await {
                warn!(error = %e, "API server stopped");
            }
        });
    }

    // Ctrl-C acts as a Back press
    cancel_on(tx.clone(), async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    });
    if !args.headless {
        // Without the API, end of stdin ends the session
        let stdin = BufReader::new(tokio::io::stdin());
        tokio::spawn(feed_keypad(stdin, tx.clone(), !args.serve));
    }
    drop(tx);

    let options = RunOptions { max_ticks, ..Default::default() };
    let summary = run_clock(&mut session, &mut radio, &mut sinks, &mut rx, options).await;

    if args.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!(
            "Session ended. Ticks: {} | Samples: {} | Final: {}",
            summary.ticks, summary.total_samples, summary.final_status
        );
    }
    Ok(())
}
