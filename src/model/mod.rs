//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod column;
pub mod error;
pub mod identifiers;
pub mod record;
pub mod schema;

// Re-export for convenience
pub use column::{ColumnDef, ColumnSet, ColumnType};
pub use identifiers::{ColumnId, InvalidColumnId, InvalidRecordId, RecordId, SELECT_COLUMN_ID};
pub use record::{Record, RecordError};
pub use schema::{CustomDocument, EntityConfig, EntityKind, FieldSchema, SelectOption};
