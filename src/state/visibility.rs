//! Column visibility policy.
//!
//! Without an explicit override from the caller, visibility is always reset
//! to a computed default: the first `limit` default-visible columns are
//! shown and the rest hidden, so wide schemas never load with every column
//! on screen. Some entity tables are exempt from the cap.

use crate::model::{ColumnId, ColumnSet};
use std::collections::BTreeMap;

/// Default maximum number of columns visible on first load.
pub const DEFAULT_VISIBLE_LIMIT: usize = 20;

/// Column id to visibility flag.
pub type VisibilityMap = BTreeMap<ColumnId, bool>;

/// How the default visibility is computed for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityPolicy {
    /// Maximum number of data columns visible by default.
    pub limit: usize,
    /// Entity-specific exemption: no cap at all.
    pub uncapped: bool,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self {
            limit: DEFAULT_VISIBLE_LIMIT,
            uncapped: false,
        }
    }
}

/// Compute the default visibility for a column set.
///
/// Columns flagged `default_visible` are shown in definition order until the
/// cap is reached. The selection column is always visible.
pub fn default_visibility(columns: &ColumnSet, policy: VisibilityPolicy) -> VisibilityMap {
    let mut shown = 0usize;
    let mut map = VisibilityMap::new();
    map.insert(ColumnId::select(), true);
    for column in columns.data_columns() {
        let visible = column.default_visible && (policy.uncapped || shown < policy.limit);
        if visible {
            shown += 1;
        }
        map.insert(column.id.clone(), visible);
    }
    map
}

/// Resolve the effective visibility at table initialization.
///
/// With no override the computed default is used, regardless of anything
/// previously stored. An override is layered over the default; entries for
/// unknown columns and for the selection column are ignored.
pub fn resolve_visibility(
    columns: &ColumnSet,
    policy: VisibilityPolicy,
    override_map: Option<&VisibilityMap>,
) -> VisibilityMap {
    let mut map = default_visibility(columns, policy);
    if let Some(overrides) = override_map {
        for (id, visible) in overrides {
            if !id.is_select() && columns.get(id.as_str()).is_some() {
                map.insert(id.clone(), *visible);
            }
        }
    }
    map
}

/// Pointwise update. The selection column cannot be hidden.
pub fn set_visibility(map: &mut VisibilityMap, id: &ColumnId, visible: bool) {
    if id.is_select() {
        tracing::debug!("Ignoring visibility change for pinned selection column");
        return;
    }
    map.insert(id.clone(), visible);
}

/// Set every data column to `visible`, leaving the selection column alone.
pub fn set_all(map: &mut VisibilityMap, visible: bool) {
    for (id, flag) in map.iter_mut() {
        if !id.is_select() {
            *flag = visible;
        }
    }
}

/// Whether a column is visible. Unknown columns count as visible.
pub fn is_visible(map: &VisibilityMap, id: &ColumnId) -> bool {
    id.is_select() || map.get(id).copied().unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnDef, ColumnType};

    fn wide_columns(n: usize) -> ColumnSet {
        ColumnSet::new((0..n).map(|i| ColumnDef {
            id: ColumnId::new(format!("c{i}")).unwrap(),
            header: format!("C{i}"),
            path: format!("c{i}"),
            column_type: ColumnType::Text,
            default_visible: true,
        }))
    }

    fn visible_count(map: &VisibilityMap) -> usize {
        map.iter().filter(|(id, v)| !id.is_select() && **v).count()
    }

    #[test]
    fn default_caps_visible_columns() {
        let columns = wide_columns(30);
        let map = default_visibility(&columns, VisibilityPolicy::default());
        assert_eq!(visible_count(&map), DEFAULT_VISIBLE_LIMIT);
        assert!(map[&ColumnId::new("c19").unwrap()]);
        assert!(!map[&ColumnId::new("c20").unwrap()]);
        assert!(map[&ColumnId::select()]);
    }

    #[test]
    fn uncapped_policy_shows_all_default_visible_columns() {
        let columns = wide_columns(30);
        let policy = VisibilityPolicy {
            limit: DEFAULT_VISIBLE_LIMIT,
            uncapped: true,
        };
        assert_eq!(visible_count(&default_visibility(&columns, policy)), 30);
    }

    #[test]
    fn hidden_by_default_columns_do_not_consume_cap() {
        let mut defs: Vec<ColumnDef> = wide_columns(3).data_columns().cloned().collect();
        defs[0].default_visible = false;
        let columns = ColumnSet::new(defs);
        let map = default_visibility(
            &columns,
            VisibilityPolicy {
                limit: 2,
                uncapped: false,
            },
        );
        assert!(!map[&ColumnId::new("c0").unwrap()]);
        assert!(map[&ColumnId::new("c1").unwrap()]);
        assert!(map[&ColumnId::new("c2").unwrap()]);
    }

    #[test]
    fn resolve_without_override_is_default() {
        let columns = wide_columns(25);
        let policy = VisibilityPolicy::default();
        assert_eq!(
            resolve_visibility(&columns, policy, None),
            default_visibility(&columns, policy)
        );
    }

    #[test]
    fn resolve_override_layers_over_default() {
        let columns = wide_columns(25);
        let mut overrides = VisibilityMap::new();
        overrides.insert(ColumnId::new("c24").unwrap(), true);
        overrides.insert(ColumnId::new("c0").unwrap(), false);
        overrides.insert(ColumnId::select(), false);
        overrides.insert(ColumnId::new("ghost").unwrap(), true);

        let map = resolve_visibility(&columns, VisibilityPolicy::default(), Some(&overrides));
        assert!(map[&ColumnId::new("c24").unwrap()]);
        assert!(!map[&ColumnId::new("c0").unwrap()]);
        assert!(map[&ColumnId::select()]);
        assert!(!map.contains_key(&ColumnId::new("ghost").unwrap()));
    }

    #[test]
    fn select_column_cannot_be_hidden() {
        let columns = wide_columns(2);
        let mut map = default_visibility(&columns, VisibilityPolicy::default());
        set_visibility(&mut map, &ColumnId::select(), false);
        set_all(&mut map, false);
        assert!(is_visible(&map, &ColumnId::select()));
        assert_eq!(visible_count(&map), 0);
    }
}
