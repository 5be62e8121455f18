//! Text rendering of table pages.

pub mod format;
pub mod table;

pub use format::{format_cell, format_money, format_percentage, format_rating};
pub use table::{render_footer, render_table, MAX_COLUMN_WIDTH};
