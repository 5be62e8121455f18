//! Opaque entity records.
//!
//! Records are loosely-typed JSON objects owned by an external store. The
//! engine reads them through path accessors only; writes go through a
//! field update sink.

use super::identifiers::{InvalidRecordId, RecordId};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors constructing a [`Record`] from raw JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The JSON value is not an object.
    #[error("Record must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The object carries no usable `id` field.
    #[error("Record has no 'id' field")]
    MissingId,

    /// The `id` field is present but empty.
    #[error("Invalid record id: {0}")]
    InvalidId(#[from] InvalidRecordId),
}

/// One entity record: its id plus the raw JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    data: Value,
}

impl Record {
    /// Build a record from a JSON object with a string or integer `id`.
    pub fn from_value(data: Value) -> Result<Self, RecordError> {
        let obj = data
            .as_object()
            .ok_or_else(|| RecordError::NotAnObject(json_kind(&data)))?;
        let id = match obj.get("id") {
            Some(Value::String(s)) => RecordId::new(s.clone())?,
            Some(Value::Number(n)) => RecordId::new(n.to_string())?,
            _ => return Err(RecordError::MissingId),
        };
        Ok(Self { id, data })
    }

    /// Record id.
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Raw JSON body.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Write `value` at a dotted path, creating intermediate objects.
    ///
    /// Used by in-process field update sinks; the table engine itself never
    /// calls this.
    pub fn set_path(&mut self, path: &str, value: Value) {
        set_path(&mut self.data, path, value);
    }
}

/// Write `value` at a dotted path inside `root`, replacing any non-object
/// intermediate with an empty object.
pub fn set_path(root: &mut Value, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = root;
    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Some(map) = current.as_object_mut() else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
