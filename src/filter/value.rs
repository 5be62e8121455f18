//! Filter value shapes.
//!
//! Filters arrive as loosely-typed JSON in one of two shapes:
//!
//! - the op-tagged shape: `{"op": "text", "mode": "contains", "val": "acme"}`
//! - the normalized shape: `{"kind": "text", "op": "contains", "value": "acme"}`
//!
//! plus scalar shorthands (a bare string, boolean, number or array). All of
//! them parse into the single [`FilterValue`] sum type, which the evaluator
//! matches exhaustively. Parsing distinguishes three outcomes: a real filter,
//! the identity filter (`Ok(None)`), and a malformed payload (`Err`).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Why a filter payload could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterShapeError {
    /// The object matches neither known shape.
    #[error("Unrecognized filter shape: {0}")]
    UnknownShape(String),

    /// A normalized filter names an operator its kind does not support.
    #[error("Operator '{op}' is not supported for {kind} filters")]
    UnsupportedOperator {
        /// Normalized filter kind.
        kind: &'static str,
        /// Offending operator.
        op: String,
    },

    /// The operand has the wrong JSON type.
    #[error("Invalid operand for {kind} filter: expected {expected}")]
    InvalidOperand {
        /// Filter kind.
        kind: &'static str,
        /// What was expected.
        expected: &'static str,
    },
}

/// Text comparison mode. All modes are case-insensitive after trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextMode {
    /// Substring match.
    Contains,
    /// Whole-value match.
    #[serde(alias = "equals")]
    Eq,
    /// Prefix match.
    #[serde(alias = "startsWith")]
    Starts,
    /// Suffix match.
    #[serde(alias = "endsWith")]
    Ends,
}

/// Relational operator shared by numeric and date comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
}

impl Relation {
    /// Apply the relation to two ordered values.
    pub fn holds<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            Relation::Eq => lhs == rhs,
            Relation::Ne => lhs != rhs,
            Relation::Gt => lhs > rhs,
            Relation::Gte => lhs >= rhs,
            Relation::Lt => lhs < rhs,
            Relation::Lte => lhs <= rhs,
        }
    }

    fn parse(op: &str) -> Option<Self> {
        match op {
            "eq" | "equals" | "=" => Some(Relation::Eq),
            "ne" | "neq" | "!=" => Some(Relation::Ne),
            "gt" | ">" => Some(Relation::Gt),
            "gte" | ">=" => Some(Relation::Gte),
            "lt" | "<" => Some(Relation::Lt),
            "lte" | "<=" => Some(Relation::Lte),
            _ => None,
        }
    }
}

/// Date filter: one bound with a relation, or an inclusive range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DateFilter {
    /// Compare the cell against a single date.
    Single {
        /// Relation between cell and `value`.
        rel: Relation,
        /// Date or datetime text. Operands of other JSON types are kept in
        /// their JSON text form and never parse.
        #[serde(deserialize_with = "operand")]
        value: String,
    },
    /// Inclusive range; an open bound is `None` or blank.
    Range {
        /// Lower bound.
        #[serde(
            default,
            deserialize_with = "optional_operand",
            skip_serializing_if = "Option::is_none"
        )]
        from: Option<String>,
        /// Upper bound.
        #[serde(
            default,
            deserialize_with = "optional_operand",
            skip_serializing_if = "Option::is_none"
        )]
        to: Option<String>,
    },
}

/// Typed filter value, one variant per filter kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum FilterValue {
    /// Cell is present and not blank.
    NotEmpty,
    /// Cell is missing, null or blank.
    IsEmpty,
    /// Case-insensitive text comparison.
    Text {
        /// Comparison mode.
        mode: TextMode,
        /// Needle.
        #[serde(deserialize_with = "string_or_number")]
        val: String,
    },
    /// Numeric comparison; both sides are parsed as floats.
    Cmp {
        /// Relation between cell and operand.
        rel: Relation,
        /// Raw operand text, parsed at evaluation time.
        #[serde(deserialize_with = "operand")]
        val: String,
    },
    /// Date comparison.
    Date(DateFilter),
    /// Truthiness equality.
    Bool {
        /// Expected truthiness.
        val: bool,
    },
    /// Case-insensitive membership.
    In {
        /// Accepted values.
        #[serde(deserialize_with = "strings_or_numbers")]
        vals: Vec<String>,
    },
}

const NORMALIZED_KINDS: [&str; 6] = ["text", "number", "date", "boolean", "enum", "relation"];

impl FilterValue {
    /// Interpret a raw filter payload.
    ///
    /// Returns `Ok(None)` for the identity filter (absent, `null`, blank
    /// string, empty list) and `Err` for payloads of unexpected shape.
    pub fn from_json(raw: &Value) -> Result<Option<Self>, FilterShapeError> {
        match raw {
            Value::Null => Ok(None),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => Ok(Some(FilterValue::Text {
                mode: TextMode::Contains,
                val: s.clone(),
            })),
            Value::Bool(b) => Ok(Some(FilterValue::Bool { val: *b })),
            Value::Number(n) => Ok(Some(FilterValue::Cmp {
                rel: Relation::Eq,
                val: n.to_string(),
            })),
            Value::Array(items) => {
                let vals = scalar_strings(items).ok_or(FilterShapeError::InvalidOperand {
                    kind: "in",
                    expected: "a list of strings or numbers",
                })?;
                Ok(in_filter(vals))
            }
            Value::Object(map) => {
                let kind = map.get("kind").and_then(Value::as_str);
                // Date filters may omit the `op` tag.
                if !map.contains_key("op") && matches!(kind, Some("single" | "range")) {
                    let date: DateFilter = serde_json::from_value(raw.clone())
                        .map_err(|e| FilterShapeError::UnknownShape(e.to_string()))?;
                    return Ok(Some(FilterValue::Date(date)));
                }
                let normalized_kind = kind.filter(|k| NORMALIZED_KINDS.contains(k));
                match normalized_kind {
                    Some(_) => {
                        let n: NormalizedFilter = serde_json::from_value(raw.clone())
                            .map_err(|e| FilterShapeError::UnknownShape(e.to_string()))?;
                        n.into_filter_value()
                    }
                    None => {
                        let f: FilterValue = serde_json::from_value(raw.clone())
                            .map_err(|e| FilterShapeError::UnknownShape(e.to_string()))?;
                        Ok(f.into_effective())
                    }
                }
            }
        }
    }

    /// Collapse forms that filter nothing into the identity.
    fn into_effective(self) -> Option<Self> {
        match self {
            FilterValue::In { vals } => in_filter(vals),
            other => Some(other),
        }
    }

    /// Serialize back to the op-tagged JSON shape.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn in_filter(vals: Vec<String>) -> Option<FilterValue> {
    let vals: Vec<String> = vals.into_iter().filter(|v| !v.trim().is_empty()).collect();
    if vals.is_empty() {
        None
    } else {
        Some(FilterValue::In { vals })
    }
}

/// Filter kinds of the normalized shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizedKind {
    /// Text comparison.
    Text,
    /// Numeric comparison.
    Number,
    /// Date comparison or range.
    Date,
    /// Boolean equality.
    Boolean,
    /// Membership in a value list.
    Enum,
    /// Membership against a related record's display value.
    Relation,
}

impl NormalizedKind {
    fn name(self) -> &'static str {
        match self {
            NormalizedKind::Text => "text",
            NormalizedKind::Number => "number",
            NormalizedKind::Date => "date",
            NormalizedKind::Boolean => "boolean",
            NormalizedKind::Enum => "enum",
            NormalizedKind::Relation => "relation",
        }
    }
}

/// The normalized `{kind, op, value}` filter shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NormalizedFilter {
    /// Filter kind.
    pub kind: NormalizedKind,
    /// Operator name.
    pub op: String,
    /// Operand; shape depends on `kind` and `op`.
    #[serde(default)]
    pub value: Value,
}

impl NormalizedFilter {
    /// Dispatch onto the same semantics as the op-tagged shape.
    pub fn into_filter_value(self) -> Result<Option<FilterValue>, FilterShapeError> {
        let kind = self.kind.name();
        match self.op.as_str() {
            "isEmpty" | "empty" => return Ok(Some(FilterValue::IsEmpty)),
            "notEmpty" | "isNotEmpty" => return Ok(Some(FilterValue::NotEmpty)),
            _ => {}
        }
        if self.value.is_null() {
            return Ok(None);
        }
        let unsupported = || FilterShapeError::UnsupportedOperator {
            kind,
            op: self.op.clone(),
        };

        match self.kind {
            NormalizedKind::Text => {
                let mode = match self.op.as_str() {
                    "contains" => TextMode::Contains,
                    "eq" | "equals" => TextMode::Eq,
                    "starts" | "startsWith" => TextMode::Starts,
                    "ends" | "endsWith" => TextMode::Ends,
                    _ => return Err(unsupported()),
                };
                let val = scalar_string(&self.value).ok_or(FilterShapeError::InvalidOperand {
                    kind,
                    expected: "a string",
                })?;
                if val.trim().is_empty() {
                    return Ok(None);
                }
                Ok(Some(FilterValue::Text { mode, val }))
            }
            NormalizedKind::Number => {
                let rel = Relation::parse(&self.op).ok_or_else(unsupported)?;
                Ok(Some(FilterValue::Cmp {
                    rel,
                    val: operand_text(&self.value),
                }))
            }
            NormalizedKind::Date => {
                if self.op == "between" || self.op == "range" {
                    let bounds = self.value.as_object().ok_or(FilterShapeError::InvalidOperand {
                        kind,
                        expected: "an object with from/to",
                    })?;
                    let bound = |key: &str| bounds.get(key).and_then(optional_operand_text);
                    return Ok(Some(FilterValue::Date(DateFilter::Range {
                        from: bound("from"),
                        to: bound("to"),
                    })));
                }
                let rel = Relation::parse(&self.op).ok_or_else(unsupported)?;
                Ok(Some(FilterValue::Date(DateFilter::Single {
                    rel,
                    value: operand_text(&self.value),
                })))
            }
            NormalizedKind::Boolean => {
                if !matches!(self.op.as_str(), "eq" | "equals" | "is") {
                    return Err(unsupported());
                }
                let val = self.value.as_bool().ok_or(FilterShapeError::InvalidOperand {
                    kind,
                    expected: "a boolean",
                })?;
                Ok(Some(FilterValue::Bool { val }))
            }
            NormalizedKind::Enum | NormalizedKind::Relation => {
                if !matches!(self.op.as_str(), "in" | "eq" | "equals" | "is") {
                    return Err(unsupported());
                }
                let vals = match &self.value {
                    Value::Array(items) => scalar_strings(items),
                    other => scalar_string(other).map(|s| vec![s]),
                }
                .ok_or(FilterShapeError::InvalidOperand {
                    kind,
                    expected: "a value or list of values",
                })?;
                Ok(in_filter(vals))
            }
        }
    }
}

/// String form of a scalar operand; objects and arrays yield `None`.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_strings(items: &[Value]) -> Option<Vec<String>> {
    items.iter().map(scalar_string).collect()
}

/// Text of a comparison operand. Operands that are not scalars keep their
/// JSON text, which neither the number nor the date parser accepts, so the
/// comparison fails closed instead of the filter being dropped as malformed.
fn operand_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => scalar_string(other).unwrap_or_else(|| other.to_string()),
    }
}

/// Like [`operand_text`], but `null` is an open bound.
fn optional_operand_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(operand_text(other)),
    }
}

fn operand<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(operand_text(&Value::deserialize(deserializer)?))
}

fn optional_operand<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_operand_text(&Value::deserialize(deserializer)?))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_string(&value).ok_or_else(|| serde::de::Error::custom("expected a string or number"))
}

fn strings_or_numbers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<Value>::deserialize(deserializer)?;
    scalar_strings(&items).ok_or_else(|| serde::de::Error::custom("expected strings or numbers"))
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
