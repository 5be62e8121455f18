//! Column definitions derived from a field schema.
//!
//! A [`ColumnSet`] is built once per table instance and never mutated
//! afterwards. The pinned selection column always comes first.

use super::identifiers::ColumnId;
use serde::{Deserialize, Serialize};

/// Closed set of column value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    /// Free text.
    Text,
    /// Plain number.
    Number,
    /// Calendar date.
    Date,
    /// Exact instant.
    #[serde(alias = "datetime")]
    DateTime,
    /// True or false.
    Boolean,
    /// One of a fixed option list.
    #[serde(alias = "enum")]
    Select,
    /// Star rating.
    Rating,
    /// Workflow status, rendered like a select.
    Status,
    /// Currency amount.
    Money,
    /// Percentage value.
    Percentage,
    /// Phone number.
    Phone,
    /// Custom document verification flag.
    VerificationCheckbox,
    /// Derived from other fields; never editable.
    Calculated,
}

impl ColumnType {
    /// Types whose cells compare numerically when sorting.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ColumnType::Number | ColumnType::Money | ColumnType::Percentage | ColumnType::Rating
        )
    }

    /// Types whose cells hold a calendar date or an instant.
    pub fn is_temporal(self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::DateTime)
    }

    /// Types whose cells hold a truthy/falsy flag.
    pub fn is_boolean(self) -> bool {
        matches!(self, ColumnType::Boolean | ColumnType::VerificationCheckbox)
    }
}

/// Static metadata for one displayable, filterable attribute of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Stable, unique column id.
    pub id: ColumnId,
    /// Human-readable header text.
    pub header: String,
    /// Dot-separated accessor path into a record.
    pub path: String,
    /// Value type driving filtering, sorting and formatting.
    pub column_type: ColumnType,
    /// Whether the column is visible before any cap is applied.
    pub default_visible: bool,
}

impl ColumnDef {
    /// The pinned row-selection column.
    pub fn select() -> Self {
        Self {
            id: ColumnId::select(),
            header: String::new(),
            path: String::new(),
            column_type: ColumnType::Boolean,
            default_visible: true,
        }
    }

    /// Whether this is the pinned selection column.
    pub fn is_select(&self) -> bool {
        self.id.is_select()
    }

    /// Whether the column accepts sort and filter state.
    pub fn is_data_column(&self) -> bool {
        !self.is_select()
    }
}

/// Ordered, immutable collection of column definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<ColumnDef>,
}

impl ColumnSet {
    /// Build a column set, pinning the selection column first and dropping
    /// duplicate ids (first definition wins).
    pub fn new(columns: impl IntoIterator<Item = ColumnDef>) -> Self {
        let mut out = vec![ColumnDef::select()];
        for column in columns {
            if out.iter().any(|c| c.id == column.id) {
                tracing::debug!(column = %column.id, "Skipping duplicate column definition");
                continue;
            }
            out.push(column);
        }
        Self { columns: out }
    }

    /// All columns, selection column first.
    pub fn all(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Columns that carry record data (everything except the selection column).
    pub fn data_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.is_data_column())
    }

    /// Look up a column by id.
    pub fn get(&self, id: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.id.as_str() == id)
    }

    /// Column ids in definition order.
    pub fn ids(&self) -> Vec<ColumnId> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }

    /// Number of columns, including the selection column.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the set has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
