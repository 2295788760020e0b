// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use save_alarm::{SavingsTracker, TrackerConfig};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = TrackerConfig::load().context("failed to load configuration")?;
    init_tracing(&config)?;

    tracing::info!(version = save_alarm::VERSION, "starting save-alarm");
    tracing::debug!(?config, "configuration loaded");

    let tracker = SavingsTracker::open(&config).with_context(|| {
        format!(
            "failed to open entry store at {}",
            config.resolved_database_path().display()
        )
    })?;

    run_ui_mode(tracker, &config)
}

/// Logs go to a file: the terminal belongs to the UI
fn init_tracing(config: &TrackerConfig) -> Result<()> {
    let log_path = config.resolved_log_file();
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_env("SAVEALARM_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(tracker: SavingsTracker, config: &TrackerConfig) -> Result<()> {
    let styles = save_alarm::SourceDisplayTable::with_color_overrides(&config.source_colors);
    let mut app = ui::App::new(tracker, styles)?;
    ui::run_ui(&mut app)?;

    tracing::info!("UI closed");
    Ok(())
}

/// Without the terminal UI, print the current summary as JSON
#[cfg(not(feature = "tui"))]
fn run_ui_mode(tracker: SavingsTracker, _config: &TrackerConfig) -> Result<()> {
    let summary = tracker.summary()?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
