//! idle-monitor - terminal front-end for the idle detector.
//!
//! Each stdin line is dispatched as an input event; the page is printed every
//! time the user flips between active and inactive.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use idle_monitor::{Activity, Config, Document, EventKind, IdleMonitor, InputSurface, Page, PageView};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Idle detector for a page model.
///
/// Type an event name (keypress, mousemove, touchmove, click, scroll) per line;
/// an empty line counts as a key press.
#[derive(Parser, Debug)]
#[command(name = "idle-monitor")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Silence window in milliseconds (overrides the config file).
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Echo each dispatched input event to stdout.
    #[arg(long)]
    print_events: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("idle-monitor v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config =
        Config::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;

    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }

    let monitor_config = config
        .monitor_config()
        .context("Invalid monitor configuration")?;

    let mut view = PageView::new(Page::greeting(&config.view.active_message), &config.view)
        .context("Failed to bind view to page")?;
    view.render(Activity::Active);
    println!("{}", view.page().to_html());

    let document = Arc::new(Document::new());
    let surface: Arc<dyn InputSurface> = document.clone();

    let mut monitor = IdleMonitor::start(monitor_config, surface, move |activity: Activity| {
        view.render(activity);
        println!("{}", view.page().to_html());
    });

    let result = run_input_loop(&document, args.print_events).await;
    monitor.stop();
    result
}

/// Initialize logging with the specified level.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(format!("idle_monitor={level}"))
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Dispatch stdin lines until EOF or Ctrl-C.
async fn run_input_loop(document: &Document, print_events: bool) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    debug!("stdin closed");
                    return Ok(());
                };
                dispatch_line(document, &line, print_events);
            }

            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                info!("Interrupted, shutting down");
                return Ok(());
            }
        }
    }
}

/// Parse one input line and dispatch it.
fn dispatch_line(document: &Document, line: &str, print_events: bool) {
    let trimmed = line.trim();
    let kind = if trimmed.is_empty() {
        EventKind::KeyPress
    } else {
        match trimmed.parse::<EventKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!("{}", e);
                return;
            }
        }
    };

    let delivered = document.dispatch(kind);
    if print_events {
        println!("[EVENT] | kind={kind} listeners={delivered}");
    }
}
