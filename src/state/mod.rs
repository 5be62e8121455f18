//! Table state (pure).
//!
//! Column order, visibility, sort, selection and pagination, composed into
//! [`TableState`] and driven by [`TableAction`]s. All transitions are pure
//! and testable without any storage or presentation layer.

pub mod column_order;
pub mod pagination;
pub mod row_model;
pub mod selection;
pub mod sort;
pub mod table_state;
pub mod visibility;

// Re-export for convenience
pub use column_order::{DragGesture, DragPhase, InputModality, Placement};
pub use pagination::{Pagination, DEFAULT_PAGE_SIZE};
pub use row_model::RowModel;
pub use selection::SelectionSet;
pub use sort::SortKey;
pub use table_state::{ColumnState, StateChange, TableAction, TableState};
pub use visibility::{VisibilityMap, VisibilityPolicy, DEFAULT_VISIBLE_LIMIT};
