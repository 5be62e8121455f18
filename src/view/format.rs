//! Cell formatting per column type.

use crate::filter::accessor::{display_string, is_empty, is_truthy};
use crate::filter::date::cell_instant;
use crate::filter::evaluator::cell_number;
use crate::model::{ColumnDef, ColumnType};
use serde_json::Value;

/// Highest rating rendered as stars.
pub const MAX_RATING: u8 = 5;

const CHECK: &str = "✓";
const CROSS: &str = "✗";

/// Render one cell for display.
///
/// Missing and `null` cells render empty for every type. Cells that do not
/// parse as their column's type fall back to their display string.
pub fn format_cell(column: &ColumnDef, value: Option<&Value>) -> String {
    if column.column_type != ColumnType::VerificationCheckbox && is_empty(value) {
        return String::new();
    }
    match column.column_type {
        ColumnType::Money => cell_number(value)
            .map(format_money)
            .unwrap_or_else(|| display_string(value)),
        ColumnType::Percentage => cell_number(value)
            .map(format_percentage)
            .unwrap_or_else(|| display_string(value)),
        ColumnType::Rating => cell_number(value)
            .map(format_rating)
            .unwrap_or_else(|| display_string(value)),
        ColumnType::Boolean => {
            if is_truthy(value) {
                CHECK.to_string()
            } else {
                CROSS.to_string()
            }
        }
        ColumnType::VerificationCheckbox => {
            if is_truthy(value) {
                CHECK.to_string()
            } else {
                String::new()
            }
        }
        ColumnType::Date => cell_instant(value)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| display_string(value)),
        ColumnType::DateTime => cell_instant(value)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| display_string(value)),
        ColumnType::Text
        | ColumnType::Number
        | ColumnType::Select
        | ColumnType::Status
        | ColumnType::Phone
        | ColumnType::Calculated => display_string(value),
    }
}

/// Format an integer with thousands separators.
///
/// Examples:
/// - `group_thousands(0)` → "0"
/// - `group_thousands(1234567)` → "1,234,567"
pub fn group_thousands(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

/// Format a money amount with two decimals and thousands separators.
///
/// Examples:
/// - `format_money(2.45)` → "$2.45"
/// - `format_money(-1234.5)` → "-$1,234.50"
pub fn format_money(amount: f64) -> String {
    let cents_total = (amount.abs() * 100.0).round() as u64;
    let dollars = cents_total / 100;
    let cents = cents_total % 100;
    let sign = if amount < 0.0 && cents_total > 0 { "-" } else { "" };

    format!("{sign}${}.{cents:02}", group_thousands(dollars))
}

/// Format a percentage, dropping trailing zeros: `12.5` → "12.5%".
pub fn format_percentage(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text}%")
}

/// Render a rating as filled and empty stars, clamped to `0..=MAX_RATING`.
pub fn format_rating(value: f64) -> String {
    let filled = value.round().clamp(0.0, f64::from(MAX_RATING)) as usize;
    let empty = usize::from(MAX_RATING) - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}
