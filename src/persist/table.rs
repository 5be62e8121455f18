//! Persisted table layout.
//!
//! Order, sort and filters are stored together as one versioned JSON blob
//! under `<namespace>:state`. Visibility is stored separately under
//! `<namespace>:visibility` and is only applied when the caller passes it
//! back explicitly; otherwise every table opens with the computed default.
//!
//! Corrupt or unrecognised blobs are discarded with a warning and the
//! table falls back to defaults.

use super::{KeyValueStore, StoreError};
use crate::model::{ColumnId, ColumnSet};
use crate::state::{SortKey, StateChange, TableAction, TableState, VisibilityMap, VisibilityPolicy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Version tag written into every layout blob.
pub const STATE_VERSION: u32 = 1;

/// Serialized shape of a table's layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTableState {
    /// Blob format version.
    pub version: u32,
    /// Column order.
    #[serde(default)]
    pub order: Vec<ColumnId>,
    /// Sort keys in priority order.
    #[serde(default)]
    pub sort: Vec<SortKey>,
    /// Raw filter payloads, re-parsed on load.
    #[serde(default)]
    pub filters: BTreeMap<ColumnId, Value>,
}

impl PersistedTableState {
    /// Capture the persistable part of a table state.
    pub fn capture(state: &TableState) -> Self {
        Self {
            version: STATE_VERSION,
            order: state.columns.order.clone(),
            sort: state.columns.sort.clone(),
            filters: state.filter_payloads(),
        }
    }
}

/// Key naming for one table namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStorage {
    namespace: String,
}

impl TableStorage {
    /// Storage under a per-table namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Key of the layout blob.
    pub fn state_key(&self) -> String {
        format!("{}:state", self.namespace)
    }

    /// Key of the visibility map.
    pub fn visibility_key(&self) -> String {
        format!("{}:visibility", self.namespace)
    }

    /// Stored layout, if present and readable.
    pub fn load_layout(&self, store: &impl KeyValueStore) -> Option<PersistedTableState> {
        let key = self.state_key();
        let raw = store.get(&key)?;
        let layout: PersistedTableState = match serde_json::from_str(&raw) {
            Ok(layout) => layout,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Discarding corrupt table state");
                return None;
            }
        };
        if layout.version != STATE_VERSION {
            tracing::warn!(
                key = %key,
                version = layout.version,
                "Discarding table state with unknown version"
            );
            return None;
        }
        Some(layout)
    }

    /// Write the layout blob.
    pub fn save_layout(
        &self,
        store: &mut impl KeyValueStore,
        state: &TableState,
    ) -> Result<(), StoreError> {
        let blob = serde_json::to_string(&PersistedTableState::capture(state))?;
        store.set(&self.state_key(), blob)
    }

    /// Stored visibility map, if present and readable.
    pub fn load_visibility(&self, store: &impl KeyValueStore) -> Option<VisibilityMap> {
        let key = self.visibility_key();
        let raw = store.get(&key)?;
        serde_json::from_str(&raw)
            .map_err(|err| {
                tracing::warn!(key = %key, error = %err, "Discarding corrupt visibility state");
            })
            .ok()
    }

    /// Write the visibility map.
    pub fn save_visibility(
        &self,
        store: &mut impl KeyValueStore,
        visibility: &VisibilityMap,
    ) -> Result<(), StoreError> {
        let blob = serde_json::to_string(visibility)?;
        store.set(&self.visibility_key(), blob)
    }
}

/// A table state wired to a store: every persisted change is written
/// through as soon as it is applied.
#[derive(Debug)]
pub struct PersistentTable<S> {
    store: S,
    storage: TableStorage,
    state: TableState,
}

impl<S: KeyValueStore> PersistentTable<S> {
    /// Open a table, restoring any stored layout.
    pub fn open(
        store: S,
        namespace: impl Into<String>,
        defs: ColumnSet,
        policy: VisibilityPolicy,
        page_size: usize,
        visibility_override: Option<&VisibilityMap>,
    ) -> Self {
        let storage = TableStorage::new(namespace);
        let mut state = TableState::initialize(defs, policy, page_size, visibility_override);
        if let Some(layout) = storage.load_layout(&store) {
            tracing::debug!(key = %storage.state_key(), "Restoring table layout");
            state.restore_layout(&layout.order, layout.sort, &layout.filters);
        }
        Self {
            store,
            storage,
            state,
        }
    }

    /// Current state.
    pub fn state(&self) -> &TableState {
        &self.state
    }

    /// Key layout in the store.
    pub fn storage(&self) -> &TableStorage {
        &self.storage
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply an action and write through whatever it changed.
    pub fn dispatch(&mut self, action: TableAction) -> Result<StateChange, StoreError> {
        let change = self.state.apply(action);
        match change {
            StateChange::Layout => self.storage.save_layout(&mut self.store, &self.state)?,
            StateChange::Visibility => {
                self.storage
                    .save_visibility(&mut self.store, &self.state.columns.visibility)?
            }
            StateChange::Unchanged | StateChange::Transient => {}
        }
        Ok(change)
    }

    /// Write layout and visibility unconditionally.
    pub fn save(&mut self) -> Result<(), StoreError> {
        self.storage.save_layout(&mut self.store, &self.state)?;
        self.storage
            .save_visibility(&mut self.store, &self.state.columns.visibility)
    }

    /// Give up the store and keep the state.
    pub fn into_state(self) -> TableState {
        self.state
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
