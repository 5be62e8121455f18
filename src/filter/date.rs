//! Date filter semantics.
//!
//! Columns are either date-only (calendar dates such as a date of birth) or
//! datetime (exact instants such as a creation timestamp). Date-only
//! comparisons snap the filter bound to the start or end of its calendar day;
//! datetime comparisons use the exact instant. Calendar days are UTC days.
//!
//! Unparsable filter bounds or cell values never match.

use super::value::{DateFilter, Relation};
use crate::model::ColumnType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde_json::Value;

/// Column ids that always hold calendar dates, whatever their declared type.
pub const DATE_ONLY_COLUMNS: &[&str] = &[
    "dateOfBirth",
    "birthDate",
    "dob",
    "startDate",
    "endDate",
    "contractEndDate",
    "hireDate",
    "dueDate",
    "expiryDate",
    "passportExpiry",
];

/// How a date column's values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateGranularity {
    /// Only the calendar day is significant.
    DateOnly,
    /// The exact instant is significant.
    DateTime,
}

/// Classify a column by id, falling back to its declared type.
pub fn classify(column_id: &str, column_type: Option<ColumnType>) -> DateGranularity {
    if DATE_ONLY_COLUMNS.contains(&column_id) || column_type == Some(ColumnType::Date) {
        DateGranularity::DateOnly
    } else {
        DateGranularity::DateTime
    }
}

/// Parse date or datetime text into a UTC instant.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM[:SS[.fff]]` (read as UTC),
/// the same with a space separator, and bare `YYYY-MM-DD` (UTC midnight).
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 6] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
}

/// Parse a cell into an instant. Strings are parsed as text, numbers as
/// milliseconds since the Unix epoch; anything else is unparsable.
pub fn cell_instant(cell: Option<&Value>) -> Option<DateTime<Utc>> {
    match cell? {
        Value::String(s) => parse_instant(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

/// First instant of the instant's UTC calendar day.
pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&instant.date_naive().and_time(NaiveTime::MIN))
}

/// Last representable instant of the instant's UTC calendar day.
pub fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&instant.date_naive().and_time(last))
}

/// Evaluate a date filter against a cell.
pub fn matches(filter: &DateFilter, cell: Option<&Value>, granularity: DateGranularity) -> bool {
    let Some(cell) = cell_instant(cell) else {
        return false;
    };
    match filter {
        DateFilter::Single { rel, value } => {
            let Some(bound) = parse_instant(value) else {
                return false;
            };
            matches_single(*rel, cell, bound, granularity)
        }
        DateFilter::Range { from, to } => {
            let Some(lower) = range_bound(from.as_deref(), granularity, Bound::Lower) else {
                return false;
            };
            let Some(upper) = range_bound(to.as_deref(), granularity, Bound::Upper) else {
                return false;
            };
            cell >= lower && cell <= upper
        }
    }
}

fn matches_single(
    rel: Relation,
    cell: DateTime<Utc>,
    bound: DateTime<Utc>,
    granularity: DateGranularity,
) -> bool {
    match granularity {
        DateGranularity::DateTime => rel.holds(cell, bound),
        DateGranularity::DateOnly => match rel {
            Relation::Eq => cell.date_naive() == bound.date_naive(),
            Relation::Ne => cell.date_naive() != bound.date_naive(),
            Relation::Gt => cell > end_of_day(bound),
            Relation::Gte => cell >= start_of_day(bound),
            Relation::Lt => cell < start_of_day(bound),
            Relation::Lte => cell <= end_of_day(bound),
        },
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Lower,
    Upper,
}

/// Resolve a range bound. An open bound widens to the extreme instant; a
/// present but unparsable bound yields `None`.
fn range_bound(
    raw: Option<&str>,
    granularity: DateGranularity,
    bound: Bound,
) -> Option<DateTime<Utc>> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let Some(raw) = raw else {
        return Some(match bound {
            Bound::Lower => DateTime::<Utc>::MIN_UTC,
            Bound::Upper => DateTime::<Utc>::MAX_UTC,
        });
    };
    let instant = parse_instant(raw)?;
    Some(match (granularity, bound) {
        (DateGranularity::DateTime, _) => instant,
        (DateGranularity::DateOnly, Bound::Lower) => start_of_day(instant),
        (DateGranularity::DateOnly, Bound::Upper) => end_of_day(instant),
    })
}

#[cfg(test)]
#[path = "date_tests.rs"]
mod tests;
