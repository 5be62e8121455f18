//! File-backed store.
//!
//! All keys live in one JSON object file. The file is read once when the
//! store is opened and rewritten on every `set` through a temporary file
//! followed by a rename, so a crash mid-write leaves the previous contents.

use super::{KeyValueStore, StoreError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Store persisted as a JSON object of string values.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// A missing, unreadable or corrupt file opens as an empty store; the
    /// next write replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        Self { path, entries }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::DirectoryCreation {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn read_entries(path: &Path) -> BTreeMap<String, String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Unreadable state file, starting empty");
            return BTreeMap::new();
        }
    };
    serde_json::from_str(&contents).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), error = %err, "Corrupt state file, starting empty");
        BTreeMap::new()
    })
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gridline_store_{name}"));
        let _ = fs::remove_dir_all(&dir);
        dir.join("state.json")
    }

    #[test]
    fn values_survive_reopen() {
        let path = scratch("reopen");
        let mut store = FileStore::open(&path);
        store.set("table:leads:state", "{\"version\":1}".into()).unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(
            reopened.get("table:leads:state").as_deref(),
            Some("{\"version\":1}")
        );
        assert!(!path.with_extension("tmp").exists());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_file_opens_empty_and_is_replaced_on_write() {
        let path = scratch("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let mut store = FileStore::open(&path);
        assert_eq!(store.get("anything"), None);
        store.set("k", "v".into()).unwrap();
        assert_eq!(FileStore::open(&path).get("k").as_deref(), Some("v"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_opens_empty() {
        let store = FileStore::open(scratch("missing"));
        assert_eq!(store.get("k"), None);
    }
}
