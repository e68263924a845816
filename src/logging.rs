//! Tracing setup
//!
//! The editor owns the terminal, so it logs to a file through a
//! non-blocking writer. The proxy logs to stderr.

use crate::config::Config;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log file name inside the config directory
const LOG_FILE_NAME: &str = "compare-tui.log";

/// Keeps the file writer flushing until dropped at exit
pub struct LogGuard {
    _guard: WorkerGuard,
    pub path: PathBuf,
}

/// `RUST_LOG` wins over the configured level
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Log to `<config dir>/compare-tui.log` (or the temp dir without a home)
pub fn init_file_logging(level: &str) -> anyhow::Result<LogGuard> {
    let dir = Config::config_dir().unwrap_or_else(std::env::temp_dir);
    fs::create_dir_all(&dir)?;
    let path = dir.join(LOG_FILE_NAME);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", path.display(), e))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true);

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))?;

    Ok(LogGuard {
        _guard: guard,
        path,
    })
}

/// Log to stderr (proxy and one-shot commands)
pub fn init_stderr_logging(level: &str) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}
