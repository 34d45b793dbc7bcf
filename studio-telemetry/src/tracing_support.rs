//! Structured tracing helpers.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Result alias for telemetry setup.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter `{directive}`: {reason}")]
    InvalidFilter {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// The log file could not be opened.
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        /// Requested path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// A global subscriber was already installed.
    #[error("tracing subscriber already installed: {reason}")]
    AlreadyInstalled {
        /// Subscriber error message.
        reason: String,
    },
}

/// Installs the process-wide subscriber.
///
/// Console output goes to stderr because stdout carries the call protocol. When
/// `log_file` is set, the same events are appended to it without ANSI colours.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is malformed, the file cannot be
/// opened, or a subscriber is already installed.
pub fn init_subscriber(filter: &str, log_file: Option<&Path>) -> TelemetryResult<()> {
    let env_filter = EnvFilter::try_new(filter).map_err(|err| TelemetryError::InvalidFilter {
        directive: filter.to_owned(),
        reason: err.to_string(),
    })?;

    let console = fmt::layer().with_target(false).with_writer(io::stderr);
    let file = log_file
        .map(open_log_file)
        .transpose()?
        .map(|file| {
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file))
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|err| TelemetryError::AlreadyInstalled {
            reason: err.to_string(),
        })
}

fn open_log_file(path: &Path) -> TelemetryResult<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| TelemetryError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| TelemetryError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}
