//! Shared record set acting as the field update sink.

use super::{RecordSet, RecordSource};
use crate::bulk::{FieldUpdateSink, UpdateError};
use crate::model::{ColumnSet, RecordId};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Record set behind a mutex, writable through [`FieldUpdateSink`].
///
/// Field keys are translated to accessor paths through an optional map, so
/// a key like `ownerName` writes to `owner.name`. Unmapped keys are used as
/// paths directly.
#[derive(Debug, Clone, Default)]
pub struct SharedRecordSet {
    inner: Arc<Mutex<RecordSet>>,
    field_paths: BTreeMap<String, String>,
}

impl SharedRecordSet {
    /// Share an existing record set.
    pub fn new(set: RecordSet) -> Self {
        Self {
            inner: Arc::new(Mutex::new(set)),
            field_paths: BTreeMap::new(),
        }
    }

    /// Map every column id to its accessor path.
    pub fn with_columns(mut self, columns: &ColumnSet) -> Self {
        self.field_paths = columns
            .data_columns()
            .map(|c| (c.id.to_string(), c.path.clone()))
            .collect();
        self
    }

    fn lock(&self) -> MutexGuard<'_, RecordSet> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current records.
    pub fn snapshot(&self) -> RecordSet {
        self.lock().clone()
    }

    /// Revision of the underlying set.
    pub fn revision(&self) -> u64 {
        self.lock().revision()
    }

    fn path_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.field_paths.get(field).map_or(field, String::as_str)
    }
}

#[async_trait]
impl FieldUpdateSink for SharedRecordSet {
    async fn update_field(
        &self,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> Result<(), UpdateError> {
        let path = self.path_for(field);
        if self.lock().set_field(id, path, value) {
            Ok(())
        } else {
            Err(UpdateError::UnknownRecord(id.clone()))
        }
    }
}
