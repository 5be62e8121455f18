//! Error types for the gridline application.
//!
//! This module defines the top-level error taxonomy using `thiserror`. Each concern owns its
//! own error enum (config loading, record input, persisted state, bulk editing, logging) and
//! those compose into [`AppError`] via `From`, so `?` works across module boundaries.
//!
//! # Recovery Strategy
//!
//! Not every failure is an error value. The filter evaluator never fails: a malformed filter
//! payload is treated as "no filter" and an unparsable comparison operand excludes the row.
//! Corrupted persisted table state is discarded in favour of computed defaults. Only the
//! failures below reach the caller.

use crate::bulk::BulkError;
use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::persist::StoreError;
use std::path::PathBuf;
use thiserror::Error;

use super::record::RecordError;

/// Top-level application error encompassing all failure modes.
///
/// Returned from the CLI runner. Domain-specific errors convert automatically.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration file exists but could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Record input could not be read or decoded.
    #[error("Failed to read records: {0}")]
    Input(#[from] InputError),

    /// Durable key-value store failed on write.
    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    /// A record or record id is invalid.
    #[error("Invalid record: {0}")]
    Record(#[from] RecordError),

    /// A bulk action was rejected before any mutation was attempted.
    #[error("{0}")]
    Bulk(#[from] BulkError),

    /// Tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    /// Invalid command-line argument value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Output could not be written.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Errors encountered when reading records from files or stdin.
///
/// # Recovery Patterns
///
/// - **FileNotFound**: Display error and exit (user provided invalid path)
/// - **NoInput**: Display usage help - user must provide a path or pipe stdin
/// - **InvalidJson**: The input is not a JSON array or JSON-lines stream
/// - **InvalidRecord**: One record lacks an id or is not an object
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified records file does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use gridline::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.json")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.json"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The filesystem path that was not found.
        path: PathBuf,
    },

    /// No input source was provided and stdin is an interactive terminal.
    #[error("No input source: provide --records or pipe data to stdin")]
    NoInput,

    /// The input is neither a JSON array nor JSON lines.
    #[error("Invalid JSON at line {line}: {message}")]
    InvalidJson {
        /// 1-based line number (1 for whole-document parse failures).
        line: usize,
        /// Parser error message.
        message: String,
    },

    /// A decoded value is not a valid record.
    #[error("Invalid record #{index}: {source}")]
    InvalidRecord {
        /// 0-based position of the record in the input.
        index: usize,
        /// Why the record was rejected.
        #[source]
        source: RecordError,
    },

    /// Generic I/O error reading from input source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
