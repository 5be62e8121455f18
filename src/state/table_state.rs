//! Table state and its reducer.
//!
//! `TableState` is a plain value; every change goes through
//! [`TableState::apply`], which enforces the pinned selection column
//! invariants and reports which part of the state needs persisting.
//! Durable storage is handled by the caller (see `persist::table`).

use super::column_order::{self, Placement};
use super::pagination::Pagination;
use super::selection::SelectionSet;
use super::sort::{self, SortKey};
use super::visibility::{self, VisibilityMap, VisibilityPolicy};
use crate::filter::FilterValue;
use crate::model::{ColumnDef, ColumnId, ColumnSet, RecordId};
use serde_json::Value;
use std::collections::BTreeMap;

// ===== ColumnState =====

/// Order, visibility, sort and filters of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnState {
    /// Column ids in display order; the selection column is always first.
    pub order: Vec<ColumnId>,
    /// Visibility per column id.
    pub visibility: VisibilityMap,
    /// Active sort keys, most significant first.
    pub sort: Vec<SortKey>,
    /// Active typed filters per column.
    pub filters: BTreeMap<ColumnId, FilterValue>,
}

// ===== TableAction =====

/// Every transition the table state supports.
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    /// Replace the whole order. The selection column is re-pinned.
    SetOrder(Vec<ColumnId>),
    /// Drop `active` onto `over` (drag-and-drop).
    MoveColumn {
        /// Column being dragged.
        active: ColumnId,
        /// Column it was dropped on.
        over: ColumnId,
    },
    /// Move `id` immediately before or after `target`.
    MoveColumnRelative {
        /// Column to move.
        id: ColumnId,
        /// Anchor column.
        target: ColumnId,
        /// Side of the anchor to land on.
        placement: Placement,
    },
    /// Show or hide one column.
    SetVisibility {
        /// Column to change.
        id: ColumnId,
        /// New visibility.
        visible: bool,
    },
    /// Reset visibility to the computed default.
    RestoreDefaultVisibility,
    /// Hide every data column.
    HideAllColumns,
    /// Show every column.
    ShowAllColumns,
    /// Cycle a column's sort direction.
    ToggleSort {
        /// Column to sort by.
        id: ColumnId,
        /// Append to the existing sort instead of replacing it.
        multi: bool,
    },
    /// Replace the sort keys.
    SetSort(Vec<SortKey>),
    /// Set a column filter from a raw payload in any accepted shape.
    SetFilter {
        /// Filtered column.
        id: ColumnId,
        /// Raw filter payload.
        value: Value,
    },
    /// Remove one column's filter.
    ClearFilter(ColumnId),
    /// Remove all column filters.
    ClearFilters,
    /// Set the quick-search text.
    SetGlobalFilter(String),
    /// Jump to a zero-based page.
    SetPage(usize),
    /// Change rows per page.
    SetPageSize(usize),
    /// Toggle one row's selection.
    ToggleRow(RecordId),
    /// Toggle a group of rows (typically the current page) as one unit.
    ToggleRows(Vec<RecordId>),
    /// Deselect everything.
    ClearSelection,
}

/// Which part of the state an action touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// Nothing changed.
    Unchanged,
    /// Order, sort or filters changed; persist the layout blob.
    Layout,
    /// Visibility changed; persist the visibility map.
    Visibility,
    /// Paging, search or selection changed; nothing to persist.
    Transient,
}

impl StateChange {
    /// Whether the change must be written to the store.
    pub fn needs_persist(self) -> bool {
        matches!(self, StateChange::Layout | StateChange::Visibility)
    }
}

// ===== TableState =====

/// Complete state of one table instance.
#[derive(Debug, Clone)]
pub struct TableState {
    defs: ColumnSet,
    policy: VisibilityPolicy,
    /// Order, visibility, sort and filters.
    pub columns: ColumnState,
    /// Quick search across visible columns.
    pub global_filter: String,
    /// Current page window.
    pub pagination: Pagination,
    /// Checked rows.
    pub selection: SelectionSet,
}

impl TableState {
    /// Fresh state for a column set.
    ///
    /// Visibility is the computed default unless the caller passes an
    /// explicit override.
    pub fn initialize(
        defs: ColumnSet,
        policy: VisibilityPolicy,
        page_size: usize,
        visibility_override: Option<&VisibilityMap>,
    ) -> Self {
        let columns = ColumnState {
            order: defs.ids(),
            visibility: visibility::resolve_visibility(&defs, policy, visibility_override),
            sort: Vec::new(),
            filters: BTreeMap::new(),
        };
        Self {
            defs,
            policy,
            columns,
            global_filter: String::new(),
            pagination: Pagination::new(page_size),
            selection: SelectionSet::new(),
        }
    }

    /// Column definitions this state was built for.
    pub fn defs(&self) -> &ColumnSet {
        &self.defs
    }

    /// Visibility policy applied on reset.
    pub fn policy(&self) -> VisibilityPolicy {
        self.policy
    }

    /// Visible columns in display order, selection column included.
    pub fn visible_columns(&self) -> Vec<&ColumnDef> {
        self.columns
            .order
            .iter()
            .filter(|id| visibility::is_visible(&self.columns.visibility, id))
            .filter_map(|id| self.defs.get(id.as_str()))
            .collect()
    }

    /// Filters as raw JSON payloads, for persistence.
    pub fn filter_payloads(&self) -> BTreeMap<ColumnId, Value> {
        self.columns
            .filters
            .iter()
            .map(|(id, f)| (id.clone(), f.to_json()))
            .collect()
    }

    /// Restore order, sort and filters from previously stored values.
    ///
    /// Stale ids are dropped, columns added since are appended, and filter
    /// payloads are parsed with the usual fail-open policy.
    pub fn restore_layout(
        &mut self,
        order: &[ColumnId],
        sort: Vec<SortKey>,
        filters: &BTreeMap<ColumnId, Value>,
    ) {
        self.columns.order = column_order::normalize_order(order, &self.defs);
        self.columns.sort = sort.into_iter().filter(|k| self.is_data_column(&k.id)).collect();
        self.columns.filters.clear();
        for (id, raw) in filters {
            if let Some(filter) = self.parse_filter(id, raw) {
                self.columns.filters.insert(id.clone(), filter);
            }
        }
        self.pagination.page_index = 0;
    }

    /// Apply one action.
    pub fn apply(&mut self, action: TableAction) -> StateChange {
        match action {
            TableAction::SetOrder(order) => {
                let order = column_order::ensure_pinned(order);
                self.replace_order(order)
            }
            TableAction::MoveColumn { active, over } => {
                let order = column_order::move_column(&self.columns.order, &active, &over);
                self.replace_order(order)
            }
            TableAction::MoveColumnRelative {
                id,
                target,
                placement,
            } => {
                let order =
                    column_order::move_relative(&self.columns.order, &id, &target, placement);
                self.replace_order(order)
            }
            TableAction::SetVisibility { id, visible } => {
                if !self.is_data_column(&id) {
                    tracing::debug!(column = %id, "Ignoring visibility change");
                    return StateChange::Unchanged;
                }
                let mut next = self.columns.visibility.clone();
                visibility::set_visibility(&mut next, &id, visible);
                self.replace_visibility(next)
            }
            TableAction::RestoreDefaultVisibility => {
                let next = visibility::default_visibility(&self.defs, self.policy);
                self.replace_visibility(next)
            }
            TableAction::HideAllColumns => self.set_all_visible(false),
            TableAction::ShowAllColumns => self.set_all_visible(true),
            TableAction::ToggleSort { id, multi } => {
                if !self.is_data_column(&id) {
                    tracing::debug!(column = %id, "Ignoring sort on non-sortable column");
                    return StateChange::Unchanged;
                }
                self.columns.sort = sort::toggle_sort(&self.columns.sort, &id, multi);
                StateChange::Layout
            }
            TableAction::SetSort(keys) => {
                let keys: Vec<SortKey> =
                    keys.into_iter().filter(|k| self.is_data_column(&k.id)).collect();
                if keys == self.columns.sort {
                    return StateChange::Unchanged;
                }
                self.columns.sort = keys;
                StateChange::Layout
            }
            TableAction::SetFilter { id, value } => {
                if !self.is_data_column(&id) {
                    tracing::debug!(column = %id, "Ignoring filter on non-filterable column");
                    return StateChange::Unchanged;
                }
                let changed = match self.parse_filter(&id, &value) {
                    Some(filter) => self.columns.filters.insert(id, filter.clone()) != Some(filter),
                    None => self.columns.filters.remove(&id).is_some(),
                };
                self.after_filter_change(changed)
            }
            TableAction::ClearFilter(id) => {
                let changed = self.columns.filters.remove(&id).is_some();
                self.after_filter_change(changed)
            }
            TableAction::ClearFilters => {
                let changed = !self.columns.filters.is_empty();
                self.columns.filters.clear();
                self.after_filter_change(changed)
            }
            TableAction::SetGlobalFilter(query) => {
                if query == self.global_filter {
                    return StateChange::Unchanged;
                }
                self.global_filter = query;
                self.pagination.page_index = 0;
                StateChange::Transient
            }
            TableAction::SetPage(index) => {
                self.pagination.page_index = index;
                StateChange::Transient
            }
            TableAction::SetPageSize(size) => {
                self.pagination = Pagination::new(size);
                StateChange::Transient
            }
            TableAction::ToggleRow(id) => {
                self.selection.toggle(&id);
                StateChange::Transient
            }
            TableAction::ToggleRows(ids) => {
                self.selection.toggle_group(ids.iter());
                StateChange::Transient
            }
            TableAction::ClearSelection => {
                self.selection.clear();
                StateChange::Transient
            }
        }
    }

    fn is_data_column(&self, id: &ColumnId) -> bool {
        !id.is_select() && self.defs.get(id.as_str()).is_some()
    }

    /// Parse a raw payload. Malformed payloads are logged and treated as
    /// "no filter".
    fn parse_filter(&self, id: &ColumnId, raw: &Value) -> Option<FilterValue> {
        if !self.is_data_column(id) {
            return None;
        }
        match FilterValue::from_json(raw) {
            Ok(filter) => filter,
            Err(err) => {
                tracing::warn!(column = %id, error = %err, "Ignoring malformed filter value");
                None
            }
        }
    }

    fn replace_order(&mut self, order: Vec<ColumnId>) -> StateChange {
        if order == self.columns.order {
            return StateChange::Unchanged;
        }
        self.columns.order = order;
        StateChange::Layout
    }

    fn replace_visibility(&mut self, next: VisibilityMap) -> StateChange {
        if next == self.columns.visibility {
            return StateChange::Unchanged;
        }
        self.columns.visibility = next;
        StateChange::Visibility
    }

    fn set_all_visible(&mut self, visible: bool) -> StateChange {
        let mut next = self.columns.visibility.clone();
        visibility::set_all(&mut next, visible);
        self.replace_visibility(next)
    }

    fn after_filter_change(&mut self, changed: bool) -> StateChange {
        if !changed {
            return StateChange::Unchanged;
        }
        self.pagination.page_index = 0;
        StateChange::Layout
    }
}

#[cfg(test)]
#[path = "table_state_tests.rs"]
mod tests;
