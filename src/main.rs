//! # vedit entry point
//!
//! Parses the command line, sets up file logging when asked to, and hands
//! the terminal to the application controller.

use anyhow::{Context, Result};
use std::sync::Mutex;
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};
use vedit::cmd_args::CommandLineArgs;
use vedit::{config, AppController};

fn main() -> Result<()> {
    init_tracing_subscriber()?;

    let cmd_args = CommandLineArgs::parse();
    tracing::debug!("Starting with {:?}", cmd_args);

    let mut app = AppController::new(cmd_args)?;
    app.run()
}

/// Log to a file; the terminal belongs to the editor while it runs
fn init_tracing_subscriber() -> Result<()> {
    if !config::logging_requested() {
        return Ok(());
    }
    let path = config::get_log_file_path();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {path}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_env(config::LOG_LEVEL_ENV_VAR)
                .add_directive("crossterm=warn".parse()?),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(ChronoLocal::rfc_3339())
        .init();
    Ok(())
}
