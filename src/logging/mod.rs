//! Tracing subscriber initialization.
//!
//! Table output owns stdout, so diagnostics go to a log file by default.
//! `--log-stderr` routes them to stderr instead, for piping into other tools.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Log path has no file name component
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to this file, creating its directory.
    File(PathBuf),
    /// Write to stderr.
    Stderr,
}

/// Split a log path into its directory and file name, creating the directory.
fn prepare_log_file(log_path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?
        .to_string();

    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    std::fs::create_dir_all(&directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.clone(),
        source,
    })?;

    Ok((directory, file_name))
}

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`, defaulting to [`DEFAULT_FILTER`].
///
/// # Errors
///
/// Fails if the log directory cannot be created or a subscriber is
/// already installed.
pub fn init(target: &LogTarget) -> Result<(), LoggingError> {
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match target {
        LogTarget::File(path) => {
            let (directory, file_name) = prepare_log_file(path)?;
            let file_appender = tracing_appender::rolling::never(directory, file_name);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(file_appender)
                .with_ansi(false)
                .try_init()
                .map_err(|_| LoggingError::SubscriberAlreadySet)
        }
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|_| LoggingError::SubscriberAlreadySet),
    }
}
