use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Result, ScraperError};

/// Initializes the logging system with both console and file output.
///
/// Fails when `log_dir` cannot be created or written, or when a subscriber is
/// already installed.
pub fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir).map_err(|e| {
        ScraperError::Logging(format!("cannot create log dir {}: {}", log_dir.display(), e))
    })?;

    // Daily-rotated JSON log next to the human readable console output
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("arz_scraper.log")
        .build(log_dir)
        .map_err(|e| ScraperError::Logging(format!("{}: {}", log_dir.display(), e)))?;
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    // Respect RUST_LOG if set; otherwise info for our crate and warn for dependencies
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("arz_scraper=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| ScraperError::Logging(e.to_string()))?;

    // We need to keep the guard alive so logs are flushed on exit
    std::mem::forget(guard);
    Ok(())
}
