//! Visible row window.
//!
//! Recomputed eagerly from the record set and table state on every change:
//! column filters, then quick search, then sort, then the page window.

use super::table_state::TableState;
use super::{sort, visibility};
use crate::filter::{accessor, CompiledFilter, FilterEvaluator};
use crate::model::{ColumnDef, Record, RecordId};

/// Result of running the pipeline once.
#[derive(Debug, Clone)]
pub struct RowModel<'a> {
    /// Records on the current page, in display order.
    pub rows: Vec<&'a Record>,
    /// Rows passing filters and search, across all pages.
    pub filtered_count: usize,
    /// Total records before filtering.
    pub total_count: usize,
    /// Pages at the current page size.
    pub page_count: usize,
    /// Page index after clamping into range.
    pub page_index: usize,
}

impl<'a> RowModel<'a> {
    /// Run filters, quick search, sort and pagination over `records`.
    pub fn compute(records: &'a [Record], state: &TableState) -> Self {
        let defs = state.defs();
        let evaluator = FilterEvaluator::new(defs);
        let filters: Vec<CompiledFilter> = state
            .columns
            .filters
            .iter()
            .map(|(id, f)| evaluator.compile(id.as_str(), f.clone()))
            .collect();

        let needle = state.global_filter.trim().to_lowercase();
        let searchable: Vec<&ColumnDef> = defs
            .data_columns()
            .filter(|c| visibility::is_visible(&state.columns.visibility, &c.id))
            .collect();

        let mut matching: Vec<&Record> = records
            .iter()
            .filter(|r| filters.iter().all(|f| f.matches(r.data())))
            .filter(|r| needle.is_empty() || search_hit(r, &searchable, &needle))
            .collect();
        sort::sort_records(&mut matching, &state.columns.sort, defs);

        let filtered_count = matching.len();
        let window = state.pagination.window(filtered_count);
        let rows = matching[window].to_vec();

        Self {
            rows,
            filtered_count,
            total_count: records.len(),
            page_count: state.pagination.page_count(filtered_count),
            page_index: state.pagination.clamped_index(filtered_count),
        }
    }

    /// Ids of the rows on the current page, for page-wide selection.
    pub fn page_ids(&self) -> Vec<RecordId> {
        self.rows.iter().map(|r| r.id().clone()).collect()
    }
}

fn search_hit(record: &Record, columns: &[&ColumnDef], needle: &str) -> bool {
    columns.iter().any(|c| {
        accessor::text_projection(accessor::get(record.data(), &c.path)).contains(needle)
    })
}
