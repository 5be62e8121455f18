//! Record sources.
//!
//! The engine reads records through [`RecordSource`] and writes only through
//! a field update sink. [`RecordSet`] is the in-memory source used by the
//! CLI and tests; [`SharedRecordSet`] wraps it as a sink.

pub mod loader;
pub mod shared;

pub use loader::{load_records, parse_records, save_records};
pub use shared::SharedRecordSet;

use crate::model::{Record, RecordId};
use serde_json::Value;

/// Ordered records plus a change counter.
pub trait RecordSource {
    /// Records in source order.
    fn records(&self) -> &[Record];

    /// Increases every time the set mutates. Consumers compare revisions
    /// to decide whether derived views are stale.
    fn revision(&self) -> u64;
}

/// In-memory record source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
    revision: u64,
}

impl RecordSet {
    /// Record set at revision 0.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            revision: 0,
        }
    }

    /// Look up a record by id.
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace every record.
    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = records;
        self.bump();
    }

    /// Replace the record with the same id, or append it.
    pub fn upsert(&mut self, record: Record) {
        match self.records.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
        self.bump();
    }

    /// Write `value` at `path` on record `id`. Returns `false` when no such
    /// record exists.
    pub fn set_field(&mut self, id: &RecordId, path: &str, value: Value) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id() == id) else {
            return false;
        };
        record.set_path(path, value);
        self.bump();
        true
    }

    /// Take the records out.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

impl RecordSource for RecordSet {
    fn records(&self) -> &[Record] {
        &self.records
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}
