use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub const LOG_FILE: &str = "./decomp-assist.log";
pub const LOG_ENV: &str = "DECOMP_ASSIST_LOG";

/// The TUI owns the terminal, so diagnostics go to a file instead of
/// stderr. Filter comes from DECOMP_ASSIST_LOG, falling back to the
/// --log-level flag.
pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let log_file = Arc::new(std::fs::File::create(LOG_FILE)?);
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    info!("logging initialized");
    Ok(())
}
