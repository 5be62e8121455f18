//! Bulk editing.
//!
//! [`tri_state`] collects per-field intents into a patch; [`coordinator`]
//! applies that patch to the current selection through an external sink.

pub mod coordinator;
pub mod tri_state;

// Re-export for convenience
pub use coordinator::{
    BulkCoordinator, BulkEditSession, BulkError, BulkOutcome, FieldFailure, FieldUpdateSink,
    SessionPhase, UpdateError,
};
pub use tri_state::{
    editable_fields, is_mixed, placeholder, resolve_options, BulkPatch, FieldMode,
    OptionsProvider, PatchBuilder, StaticOptions, TriStateField, MIXED_PLACEHOLDER,
};
