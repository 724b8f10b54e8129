//! File logging. The terminal belongs to the console, so log lines never go
//! to stdout.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("berth.log")
}

/// `RUST_LOG` wins over `directive`; an invalid directive falls back to info.
fn filter(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber, appending to `path`.
///
/// If the file cannot be opened, logging falls back to stderr at `warn` so a
/// console session is not scribbled over.
pub fn init(path: &Path, directive: &str) {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let installed = tracing_subscriber::fmt()
                .with_env_filter(filter(directive))
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .try_init();
            if installed.is_ok() {
                let _ = LOG_GUARD.set(guard);
                tracing::info!(path = %path.display(), "logging initialized");
            }
        }
        Err(e) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("warn"))
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
            tracing::warn!(path = %path.display(), error = %e, "failed to open log file; using stderr");
        }
    }
}
