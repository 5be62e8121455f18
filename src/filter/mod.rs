//! Column filter engine (pure).
//!
//! Resolves cells through dotted paths and evaluates typed filters against
//! them. Nothing in this module mutates records or returns errors to the
//! caller; see [`evaluator`] for the fail-open/fail-closed policy.

pub mod accessor;
pub mod date;
pub mod evaluator;
pub mod value;

// Re-export for convenience
pub use date::{DateGranularity, DATE_ONLY_COLUMNS};
pub use evaluator::{CompiledFilter, FilterEvaluator};
pub use value::{DateFilter, FilterShapeError, FilterValue, NormalizedFilter, Relation, TextMode};
