//! Dotted-path value access over heterogeneous records.
//!
//! Access never fails: a missing intermediate object, a scalar in the middle
//! of the path or an out-of-range array index all yield `None`.

use serde_json::Value;

/// Resolve a dot-separated path against a JSON value.
///
/// Numeric segments index into arrays. An empty path resolves to `None`.
pub fn get<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    path.split('.').try_fold(record, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Whether a resolved cell counts as empty: missing, `null` or the empty
/// string. Whitespace-only strings and empty arrays are values.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Display string form of a cell, untrimmed and case-preserving.
///
/// Strings are returned verbatim, numbers and booleans in their JSON form,
/// arrays as a comma-separated list, objects by their `name`/`label`/`id`
/// field when present. Missing and `null` cells are the empty string.
pub fn display_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| display_string(Some(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::Object(map)) => ["name", "label", "id"]
            .iter()
            .find_map(|k| map.get(*k))
            .map(|v| display_string(Some(v)))
            .unwrap_or_default(),
    }
}

/// Lower-cased, trimmed string projection used by text comparisons.
pub fn text_projection(value: Option<&Value>) -> String {
    display_string(value).trim().to_lowercase()
}

/// JavaScript-style truthiness of a cell.
///
/// `null`, missing, `false`, `0`, `NaN`-like numbers and `""` are falsy;
/// everything else (including `"false"` and empty arrays) is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
