//! Tracing setup.
//!
//! The TUI owns the terminal, so logs go to a rolling file under
//! `<base>/logs/` instead of stderr. `RUST_LOG` overrides the configured
//! filter.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::paths;

/// Initializes the global tracing subscriber.
///
/// Returns the appender guard; dropping it flushes buffered log lines, so the
/// caller should hold it for the life of the process.
///
/// # Errors
/// Returns an error if the log directory cannot be created or the filter is
/// malformed.
pub fn init(default_filter: Option<&str>) -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(&dir, "gatehouse.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter.unwrap_or("info")))
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
