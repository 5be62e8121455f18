//! Plain-text table rendering.
//!
//! Columns are padded to the display width of their widest cell, so wide
//! glyphs (CJK, emoji, stars) stay aligned.

use super::format::format_cell;
use crate::filter::accessor;
use crate::model::{ColumnDef, Record};
use crate::state::RowModel;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a column may grow before cells are truncated.
pub const MAX_COLUMN_WIDTH: usize = 32;

const ELLIPSIS: char = '…';
const COLUMN_GAP: &str = "  ";

/// Render a header, a rule and one line per row.
///
/// The pinned selection column has no text form and is skipped.
pub fn render_table(columns: &[&ColumnDef], rows: &[&Record]) -> String {
    let columns: Vec<&ColumnDef> = columns.iter().copied().filter(|c| c.is_data_column()).collect();
    if columns.is_empty() {
        return String::new();
    }

    let headers: Vec<String> = columns.iter().map(|c| truncate(&c.header)).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| {
                    let value = accessor::get(record.data(), &column.path);
                    truncate(&format_cell(column, value))
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..columns.len())
        .map(|i| {
            std::iter::once(&headers[i])
                .chain(cells.iter().map(|row| &row[i]))
                .map(|text| text.width())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

/// One-line summary under the table, e.g. `Rows 26-50 of 120 (page 2/5)`.
pub fn render_footer(model: &RowModel<'_>, page_size: usize) -> String {
    let mut line = if model.rows.is_empty() {
        format!("No rows (page {}/{})", model.page_index + 1, model.page_count)
    } else {
        let first = model.page_index * page_size + 1;
        let last = first + model.rows.len() - 1;
        format!(
            "Rows {first}-{last} of {} (page {}/{})",
            model.filtered_count,
            model.page_index + 1,
            model.page_count
        )
    };
    if model.filtered_count != model.total_count {
        line.push_str(&format!(", filtered from {}", model.total_count));
    }
    line
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str(COLUMN_GAP);
        }
        line.push_str(cell);
        let pad = width.saturating_sub(cell.width());
        line.extend(std::iter::repeat(' ').take(pad));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Cut `text` to [`MAX_COLUMN_WIDTH`] display columns, ending in an ellipsis.
/// Newlines are flattened to spaces.
fn truncate(text: &str) -> String {
    let text = text.replace(['\n', '\r'], " ");
    if text.width() <= MAX_COLUMN_WIDTH {
        return text;
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > MAX_COLUMN_WIDTH - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    out
}
