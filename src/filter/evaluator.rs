//! Filter evaluation.
//!
//! Two failure policies coexist here and must stay distinct:
//!
//! - a filter payload of unexpected shape fails OPEN: it is logged and
//!   treated as "no filter", so one bad payload never hides the table;
//! - an unparsable numeric or date operand (filter side or cell side) fails
//!   CLOSED: the row does not match, so comparison filters never silently
//!   widen.

use super::accessor;
use super::date::{self, DateGranularity};
use super::value::{FilterValue, TextMode};
use crate::model::{ColumnSet, ColumnType};
use serde_json::Value;

/// Evaluates filters against records using a table's column definitions.
#[derive(Debug, Clone, Copy)]
pub struct FilterEvaluator<'a> {
    columns: &'a ColumnSet,
}

impl<'a> FilterEvaluator<'a> {
    /// Create an evaluator over a column set.
    pub fn new(columns: &'a ColumnSet) -> Self {
        Self { columns }
    }

    /// Whether `record` passes the raw filter payload for `column_id`.
    ///
    /// Absent or blank payloads match everything. Malformed payloads are
    /// logged and also match everything.
    pub fn matches(&self, record: &Value, column_id: &str, filter: Option<&Value>) -> bool {
        let Some(raw) = filter else {
            return true;
        };
        match FilterValue::from_json(raw) {
            Ok(None) => true,
            Ok(Some(filter)) => self.matches_filter(record, column_id, &filter),
            Err(err) => {
                tracing::warn!(column = column_id, error = %err, "Ignoring malformed filter value");
                true
            }
        }
    }

    /// Whether `record` passes a typed filter for `column_id`.
    pub fn matches_filter(&self, record: &Value, column_id: &str, filter: &FilterValue) -> bool {
        self.compile(column_id, filter.clone()).matches(record)
    }

    /// Bind a typed filter to its column's path and date granularity.
    ///
    /// Unknown column ids resolve with the id itself as the path.
    pub fn compile(&self, column_id: &str, filter: FilterValue) -> CompiledFilter {
        let column = self.columns.get(column_id);
        let path = column.map_or(column_id, |c| c.path.as_str()).to_string();
        let granularity = date::classify(column_id, column.map(|c| c.column_type));
        CompiledFilter {
            column_id: column_id.to_string(),
            path,
            granularity,
            filter,
        }
    }

    /// Parse and bind a raw payload once. Returns `None` for the identity
    /// filter and for malformed payloads (logged).
    pub fn compile_raw(&self, column_id: &str, raw: &Value) -> Option<CompiledFilter> {
        match FilterValue::from_json(raw) {
            Ok(filter) => filter.map(|f| self.compile(column_id, f)),
            Err(err) => {
                tracing::warn!(column = column_id, error = %err, "Ignoring malformed filter value");
                None
            }
        }
    }

    /// Column type for an id, if the column is known.
    pub fn column_type(&self, column_id: &str) -> Option<ColumnType> {
        self.columns.get(column_id).map(|c| c.column_type)
    }
}

/// A filter bound to the column it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    column_id: String,
    path: String,
    granularity: DateGranularity,
    filter: FilterValue,
}

impl CompiledFilter {
    /// Column this filter applies to.
    pub fn column_id(&self) -> &str {
        &self.column_id
    }

    /// The underlying typed filter.
    pub fn filter(&self) -> &FilterValue {
        &self.filter
    }

    /// Evaluate against one record.
    pub fn matches(&self, record: &Value) -> bool {
        evaluate(&self.filter, accessor::get(record, &self.path), self.granularity)
    }
}

/// Evaluate a typed filter against an already-resolved cell.
pub fn evaluate(filter: &FilterValue, cell: Option<&Value>, granularity: DateGranularity) -> bool {
    match filter {
        FilterValue::NotEmpty => !accessor::is_empty(cell),
        FilterValue::IsEmpty => accessor::is_empty(cell),
        FilterValue::Text { mode, val } => {
            let haystack = accessor::text_projection(cell);
            let needle = val.trim().to_lowercase();
            match mode {
                TextMode::Contains => haystack.contains(&needle),
                TextMode::Eq => haystack == needle,
                TextMode::Starts => haystack.starts_with(&needle),
                TextMode::Ends => haystack.ends_with(&needle),
            }
        }
        FilterValue::Cmp { rel, val } => match (cell_number(cell), parse_number(val)) {
            (Some(lhs), Some(rhs)) => rel.holds(lhs, rhs),
            _ => false,
        },
        FilterValue::Date(date_filter) => date::matches(date_filter, cell, granularity),
        FilterValue::Bool { val } => accessor::is_truthy(cell) == *val,
        FilterValue::In { vals } => {
            let accepted: Vec<String> = vals.iter().map(|v| v.trim().to_lowercase()).collect();
            let member = |v: Option<&Value>| accepted.contains(&accessor::text_projection(v));
            match cell {
                Some(Value::Array(items)) => items.iter().any(|item| member(Some(item))),
                other => member(other),
            }
        }
    }
}

/// Numeric value of a cell: JSON numbers directly, strings by their leading
/// numeric prefix. Other cells have no numeric value.
pub fn cell_number(cell: Option<&Value>) -> Option<f64> {
    match cell? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Parse the longest leading float literal of `text`, ignoring leading
/// whitespace (`"12.5kg"` → 12.5, `"kg"` → `None`).
pub fn parse_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - digits_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok().filter(|f| f.is_finite())
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
