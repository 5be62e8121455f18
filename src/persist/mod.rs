//! Durable key-value storage for table state.
//!
//! The engine never talks to a concrete backend; it goes through
//! [`KeyValueStore`], so tests swap in [`MemoryStore`] and the CLI uses
//! [`FileStore`]. Stored values are opaque JSON strings.

pub mod file;
pub mod memory;
pub mod table;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use table::{PersistedTableState, PersistentTable, TableStorage, STATE_VERSION};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a store when writing.
///
/// Reads never fail: an unreadable or corrupt backend reads as empty.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to create the directory holding the store file.
    #[error("Failed to create store directory at {path:?}: {source}")]
    DirectoryCreation {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the store file.
    #[error("Failed to write store file at {path:?}: {source}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to encode a value.
    #[error("Failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key-value storage.
pub trait KeyValueStore {
    /// Value under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}
