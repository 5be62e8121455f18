//! Type-aware multi-column sorting.
//!
//! Numeric column types compare parsed floats, date types compare parsed
//! instants, boolean types compare truthiness, everything else compares the
//! case-insensitive text projection. Missing values sort last in both
//! directions.

use crate::filter::{accessor, date, evaluator};
use crate::model::{ColumnDef, ColumnId, ColumnSet, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// One sort criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Column to sort by.
    pub id: ColumnId,
    /// Descending when `true`.
    #[serde(default)]
    pub desc: bool,
}

impl SortKey {
    /// Ascending key.
    pub fn asc(id: ColumnId) -> Self {
        Self { id, desc: false }
    }

    /// Descending key.
    pub fn desc(id: ColumnId) -> Self {
        Self { id, desc: true }
    }
}

/// Cycle a column's sort through none → ascending → descending → none.
///
/// Without `multi` the column becomes the only sort key; with `multi` other
/// keys are kept and a new key is appended.
pub fn toggle_sort(current: &[SortKey], id: &ColumnId, multi: bool) -> Vec<SortKey> {
    let existing = current.iter().find(|k| &k.id == id).map(|k| k.desc);
    let next = match existing {
        None => Some(SortKey::asc(id.clone())),
        Some(false) => Some(SortKey::desc(id.clone())),
        Some(true) => None,
    };

    if !multi {
        return next.into_iter().collect();
    }

    let mut keys: Vec<SortKey> = Vec::with_capacity(current.len() + 1);
    let mut placed = false;
    for key in current {
        if &key.id == id {
            if let Some(next) = &next {
                keys.push(next.clone());
            }
            placed = true;
        } else {
            keys.push(key.clone());
        }
    }
    if !placed {
        keys.extend(next);
    }
    keys
}

#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Missing,
    Number(f64),
    Instant(DateTime<Utc>),
    Flag(bool),
    Text(String),
}

fn sort_value(column: &ColumnDef, record: &Value) -> SortValue {
    let cell = accessor::get(record, &column.path);
    if accessor::is_empty(cell) {
        return SortValue::Missing;
    }
    let column_type = column.column_type;
    if column_type.is_numeric() {
        evaluator::cell_number(cell).map_or(SortValue::Missing, SortValue::Number)
    } else if column_type.is_temporal() {
        date::cell_instant(cell).map_or(SortValue::Missing, SortValue::Instant)
    } else if column_type.is_boolean() {
        SortValue::Flag(accessor::is_truthy(cell))
    } else {
        SortValue::Text(accessor::text_projection(cell))
    }
}

/// Compare two present values. Values of different variants (which can only
/// arise from corrupted data) compare equal.
fn compare_present(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(y),
        (SortValue::Instant(x), SortValue::Instant(y)) => x.cmp(y),
        (SortValue::Flag(x), SortValue::Flag(y)) => x.cmp(y),
        (SortValue::Text(x), SortValue::Text(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn compare_keyed(a: &[SortValue], b: &[SortValue], keys: &[SortKey]) -> Ordering {
    for ((x, y), key) in a.iter().zip(b).zip(keys) {
        let ordering = match (x, y) {
            (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
            (SortValue::Missing, _) => Ordering::Greater,
            (_, SortValue::Missing) => Ordering::Less,
            _ if key.desc => compare_present(x, y).reverse(),
            _ => compare_present(x, y),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Stable sort of record references by the given keys.
///
/// Keys naming unknown columns or the selection column are skipped.
pub fn sort_records(rows: &mut Vec<&Record>, keys: &[SortKey], columns: &ColumnSet) {
    let active: Vec<(&SortKey, &ColumnDef)> = keys
        .iter()
        .filter(|k| !k.id.is_select())
        .filter_map(|k| columns.get(k.id.as_str()).map(|c| (k, c)))
        .collect();
    if active.is_empty() {
        return;
    }
    let active_keys: Vec<SortKey> = active.iter().map(|(k, _)| (*k).clone()).collect();

    let mut keyed: Vec<(Vec<SortValue>, &Record)> = rows
        .drain(..)
        .map(|r| {
            let values = active.iter().map(|(_, c)| sort_value(c, r.data())).collect();
            (values, r)
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_keyed(a, b, &active_keys));
    rows.extend(keyed.into_iter().map(|(_, r)| r));
}

#[cfg(test)]
#[path = "sort_tests.rs"]
mod tests;
