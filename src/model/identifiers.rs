//! Core identifier newtypes with smart constructors.
//!
//! All identifiers validate non-empty strings at construction time.
//! Raw constructors are never exported - use smart constructors only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Id of the pinned row-selection column.
///
/// Always present in the column order, never hidden, sorted, filtered or dragged.
pub const SELECT_COLUMN_ID: &str = "select";

/// Stable, unique identifier for a table column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnId(String);

impl ColumnId {
    /// Smart constructor: validates non-empty column id
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidColumnId> {
        let s = raw.into();
        if s.trim().is_empty() {
            Err(InvalidColumnId::Empty)
        } else {
            Ok(Self(s))
        }
    }

    /// Id of the pinned selection column.
    pub fn select() -> Self {
        Self(SELECT_COLUMN_ID.to_string())
    }

    /// Whether this is the pinned selection column.
    pub fn is_select(&self) -> bool {
        self.0 == SELECT_COLUMN_ID
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ColumnId {
    type Error = InvalidColumnId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ColumnId> for String {
    fn from(id: ColumnId) -> Self {
        id.0
    }
}

/// Identifier of an entity record (lead, client, position).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Smart constructor: validates non-empty record id
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidRecordId> {
        let s = raw.into();
        if s.trim().is_empty() {
            Err(InvalidRecordId::Empty)
        } else {
            Ok(Self(s))
        }
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RecordId {
    type Error = InvalidRecordId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

// ===== Error Types =====

/// Why a column id was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidColumnId {
    /// The id was empty.
    #[error("Column ID cannot be empty")]
    Empty,
}

/// Why a record id was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRecordId {
    /// The id was empty.
    #[error("Record ID cannot be empty")]
    Empty,
}

// ===== Tests =====
