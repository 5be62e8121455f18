//! Tri-state patch builder.
//!
//! Each editable field is left unchanged, set to a value, or cleared to
//! null. The builder collects those intents over one bulk-edit session and
//! reduces them to a `(patch, clear)` pair.

use crate::filter::accessor;
use crate::model::{ColumnDef, ColumnSet, ColumnType, EntityConfig, Record, SelectOption};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fields that are never bulk-editable regardless of type.
pub const SYSTEM_FIELDS: [&str; 4] = ["id", "createdAt", "updatedAt", "age"];

/// Placeholder shown when the selected records disagree on a field.
pub const MIXED_PLACEHOLDER: &str = "Mixed values";

/// Intent for one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMode {
    /// Leave the field unchanged.
    #[default]
    #[serde(rename = "none")]
    Keep,
    /// Write `value`.
    Set,
    /// Write null.
    Clear,
}

/// Mode plus the value entered for it.
///
/// `value` is only kept while `mode` is [`FieldMode::Set`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriStateField {
    /// Edit intent.
    pub mode: FieldMode,
    /// Entered value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Columns that may be bulk-edited: data columns that are neither
/// calculated nor system-managed.
pub fn editable_fields(columns: &ColumnSet) -> Vec<&ColumnDef> {
    columns
        .data_columns()
        .filter(|c| c.column_type != ColumnType::Calculated)
        .filter(|c| !SYSTEM_FIELDS.contains(&c.id.as_str()))
        .collect()
}

/// Reduced output of a bulk-edit session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkPatch {
    /// Fields to set, with their values.
    pub patch: BTreeMap<String, Value>,
    /// Fields to clear.
    pub clear: Vec<String>,
}

impl BulkPatch {
    /// Number of field updates per record.
    pub fn change_count(&self) -> usize {
        self.patch.len() + self.clear.len()
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.change_count() == 0
    }

    /// Field updates in issue order: sets first, then clears as null.
    pub fn updates(&self) -> impl Iterator<Item = (&str, Value)> {
        self.patch
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .chain(self.clear.iter().map(|k| (k.as_str(), Value::Null)))
    }
}

/// Per-field intents for one bulk-edit session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchBuilder {
    fields: Vec<(String, TriStateField)>,
}

impl PatchBuilder {
    /// Builder over `keys`, all starting at [`FieldMode::Keep`].
    pub fn open<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: keys
                .into_iter()
                .map(|k| (k.into(), TriStateField::default()))
                .collect(),
        }
    }

    /// Builder over the editable fields of a column set.
    pub fn for_columns(columns: &ColumnSet) -> Self {
        Self::open(editable_fields(columns).into_iter().map(|c| c.id.to_string()))
    }

    /// Return every field to [`FieldMode::Keep`] and drop entered values.
    pub fn reset(&mut self) {
        for (_, field) in &mut self.fields {
            *field = TriStateField::default();
        }
    }

    /// Editable field keys in column order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// State of one field.
    pub fn field(&self, key: &str) -> Option<&TriStateField> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, f)| f)
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut TriStateField> {
        self.fields.iter_mut().find(|(k, _)| k == key).map(|(_, f)| f)
    }

    /// Change a field's mode. Moving to `Set` keeps any entered value;
    /// moving to `Keep` or `Clear` discards it. Returns `false` for keys
    /// that are not editable.
    pub fn set_mode(&mut self, key: &str, mode: FieldMode) -> bool {
        let Some(field) = self.field_mut(key) else {
            tracing::debug!(field = key, "Ignoring mode change for non-editable field");
            return false;
        };
        field.mode = mode;
        if mode != FieldMode::Set {
            field.value = None;
        }
        true
    }

    /// Enter a value; implies [`FieldMode::Set`].
    pub fn set_value(&mut self, key: &str, value: Value) -> bool {
        let Some(field) = self.field_mut(key) else {
            tracing::debug!(field = key, "Ignoring value for non-editable field");
            return false;
        };
        field.mode = FieldMode::Set;
        field.value = Some(value);
        true
    }

    /// Whether at least one field is set or cleared.
    pub fn can_apply(&self) -> bool {
        self.fields.iter().any(|(_, f)| f.mode != FieldMode::Keep)
    }

    /// Reduce to `(patch, clear)`. A field set without a value writes null.
    pub fn reduce(&self) -> BulkPatch {
        let mut out = BulkPatch::default();
        for (key, field) in &self.fields {
            match field.mode {
                FieldMode::Keep => {}
                FieldMode::Set => {
                    out.patch
                        .insert(key.clone(), field.value.clone().unwrap_or(Value::Null));
                }
                FieldMode::Clear => out.clear.push(key.clone()),
            }
        }
        out
    }
}

/// Whether the records disagree on the value at `path`.
///
/// Missing and null count as the same value, and top-level numbers compare
/// numerically (`1` and `1.0` agree). Strings are compared exactly, so `"1"`
/// and `1` disagree.
pub fn is_mixed(path: &str, records: &[&Record]) -> bool {
    let mut seen: Option<&Value> = None;
    for record in records {
        let value = accessor::get(record.data(), path).unwrap_or(&Value::Null);
        match seen {
            None => seen = Some(value),
            Some(first) if !same_value(first, value) => return true,
            Some(_) => {}
        }
    }
    false
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Placeholder text for a field's input: [`MIXED_PLACEHOLDER`] when the
/// records disagree, otherwise the shared value's display text (`None` when
/// empty).
pub fn placeholder(path: &str, records: &[&Record]) -> Option<String> {
    if is_mixed(path, records) {
        return Some(MIXED_PLACEHOLDER.to_string());
    }
    let first = records.first()?;
    let text = accessor::display_string(accessor::get(first.data(), path));
    (!text.is_empty()).then_some(text)
}

/// Live option source for select-typed fields.
pub trait OptionsProvider {
    /// Options for `field_key`, or `None` when this provider has none.
    fn options_for(&self, field_key: &str) -> Option<Vec<SelectOption>>;
}

/// Static option table, the fallback when no live options exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticOptions {
    table: BTreeMap<String, Vec<SelectOption>>,
}

impl StaticOptions {
    /// Table built from the schema's own option lists.
    pub fn from_config(config: &EntityConfig) -> Self {
        let table = config
            .fields
            .iter()
            .filter(|f| !f.options.is_empty())
            .map(|f| (f.key.clone(), f.options.clone()))
            .collect();
        Self { table }
    }

    /// Add or replace the options for one field.
    pub fn insert(&mut self, field_key: impl Into<String>, options: Vec<SelectOption>) {
        self.table.insert(field_key.into(), options);
    }
}

impl OptionsProvider for StaticOptions {
    fn options_for(&self, field_key: &str) -> Option<Vec<SelectOption>> {
        self.table.get(field_key).cloned()
    }
}

/// Options for a field: the live provider first, falling back to the
/// static table. Fields with no options anywhere resolve to an empty list
/// and stay editable as free text.
pub fn resolve_options(
    live: Option<&dyn OptionsProvider>,
    fallback: &StaticOptions,
    field_key: &str,
) -> Vec<SelectOption> {
    live.and_then(|p| p.options_for(field_key))
        .filter(|options| !options.is_empty())
        .or_else(|| fallback.options_for(field_key))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "tri_state_tests.rs"]
mod tests;
