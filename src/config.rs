//! Runtime configuration: where the records come from and where logs go.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::cli::InputArgs;
use crate::cli::picker::{prompt_for_csv_path, validate_csv_path};
use crate::error::AppError;

/// Environment variable (or `.env` entry) naming the records CSV.
pub const CSV_ENV_VAR: &str = "FINDASH_CSV";

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Where log lines may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// One-shot commands: stderr unless `--log-file` is given.
    Stderr,
    /// The TUI owns the terminal: only `--log-file`, otherwise no logging.
    FileOnly,
}

/// Resolve the records file: `--file`, then `FINDASH_CSV`, then the picker.
pub fn resolve_csv_path(input: &InputArgs) -> Result<PathBuf, AppError> {
    dotenvy::dotenv().ok();
    let from_env = std::env::var(CSV_ENV_VAR).ok();

    match configured_path(input.file.as_deref(), from_env.as_deref()) {
        Some(path) => validate_csv_path(&path),
        None => prompt_for_csv_path(),
    }
}

fn configured_path(explicit: Option<&Path>, from_env: Option<&str>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| from_env.map(str::trim).filter(|s| !s.is_empty()).map(PathBuf::from))
}

/// `--log-level` wins over `RUST_LOG`; `warn` when neither is set.
fn log_filter(level: Option<&str>) -> EnvFilter {
    match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
    }
}

/// Install the global tracing subscriber.
pub fn init_logging(input: &InputArgs, target: LogTarget) -> Result<(), AppError> {
    let filter = log_filter(input.log_level.as_deref());

    match (&input.log_file, target) {
        (Some(path), _) => {
            let file = File::create(path)
                .map_err(|e| AppError::new(4, format!("Failed to create log file '{}': {e}", path.display())))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
        (None, LogTarget::Stderr) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init();
        }
        (None, LogTarget::FileOnly) => {}
    }
    Ok(())
}
