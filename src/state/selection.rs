//! Row selection.
//!
//! Selection is keyed by record id, so it survives sorting, filtering and
//! paging. The selection column header toggles the whole current page.

use crate::model::RecordId;
use std::collections::BTreeSet;

/// Set of selected record ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<RecordId>,
}

impl SelectionSet {
    /// Empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one row. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &RecordId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    /// Check a row.
    pub fn select(&mut self, id: RecordId) {
        self.ids.insert(id);
    }

    /// Uncheck a row.
    pub fn deselect(&mut self, id: &RecordId) {
        self.ids.remove(id);
    }

    /// Toggle a group of rows as one unit: if every row in the group is
    /// already selected the group is deselected, otherwise all of it is
    /// selected. An empty group is a no-op.
    pub fn toggle_group<'a, I>(&mut self, group: I)
    where
        I: IntoIterator<Item = &'a RecordId>,
    {
        let group: Vec<&RecordId> = group.into_iter().collect();
        if group.is_empty() {
            return;
        }
        if group.iter().all(|id| self.ids.contains(*id)) {
            for id in group {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(group.into_iter().cloned());
        }
    }

    /// Header checkbox: toggle every row on the current page.
    pub fn toggle_page(&mut self, page_ids: &[RecordId]) {
        self.toggle_group(page_ids.iter());
    }

    /// Whether every row of a non-empty page is selected.
    pub fn is_page_selected(&self, page_ids: &[RecordId]) -> bool {
        !page_ids.is_empty() && page_ids.iter().all(|id| self.ids.contains(id))
    }

    /// Whether some but not all rows of the page are selected.
    pub fn is_page_partially_selected(&self, page_ids: &[RecordId]) -> bool {
        let selected = page_ids.iter().filter(|id| self.ids.contains(*id)).count();
        selected > 0 && selected < page_ids.len()
    }

    /// Whether a row is checked.
    pub fn contains(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    /// Uncheck everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Number of checked rows.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is checked.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.ids.iter()
    }

    /// The single selected id, if exactly one row is selected.
    pub fn single(&self) -> Option<&RecordId> {
        if self.ids.len() == 1 {
            self.ids.iter().next()
        } else {
            None
        }
    }
}

impl FromIterator<RecordId> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = RecordId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
