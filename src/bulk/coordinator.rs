//! Bulk action coordinator and bulk-edit session.
//!
//! Updates are issued one field at a time through a [`FieldUpdateSink`],
//! sequentially per record, so a later update for the same field always
//! wins. A failed field update is recorded and the batch carries on; earlier
//! successful updates are not rolled back.

use super::tri_state::{BulkPatch, FieldMode, PatchBuilder};
use crate::model::RecordId;
use crate::state::SelectionSet;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failure of a single field update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// The sink holds no record with this id.
    #[error("Record {0} not found")]
    UnknownRecord(RecordId),

    /// The sink refused the update.
    #[error("{0}")]
    Rejected(String),
}

/// The only write path into the record store.
#[async_trait]
pub trait FieldUpdateSink: Send + Sync {
    /// Write `value` to `field` of record `id`. `Value::Null` clears it.
    async fn update_field(&self, id: &RecordId, field: &str, value: Value)
        -> Result<(), UpdateError>;
}

/// Bulk action rejected before any update was issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkError {
    /// Nothing is selected.
    #[error("Select at least one record first")]
    NoSelection,

    /// Every field is left unchanged.
    #[error("Choose at least one field to set or clear")]
    NothingToApply,

    /// A single-target action was invoked with the wrong selection size.
    #[error("This action needs exactly one selected record ({selected} selected)")]
    RequiresSingleSelection {
        /// Number of records selected at the time.
        selected: usize,
    },
}

/// One failed field update within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    /// Record whose update failed.
    pub record_id: RecordId,
    /// Field key.
    pub field: String,
    /// Sink error.
    pub error: UpdateError,
}

/// Aggregate result of a bulk action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkOutcome {
    /// Records the action was applied to.
    pub applied_count: usize,
    /// Field changes per record.
    pub change_count: usize,
    /// Field updates that failed.
    pub failures: Vec<FieldFailure>,
}

impl BulkOutcome {
    /// Total field updates issued.
    pub fn attempted(&self) -> usize {
        self.applied_count * self.change_count
    }

    /// Whether every update succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Single user-facing notification for the whole batch.
    pub fn summary(&self) -> String {
        let changes = plural(self.change_count, "field", "fields");
        let records = plural(self.applied_count, "record", "records");
        if self.failures.is_empty() {
            format!("Updated {changes} on {records}")
        } else {
            format!(
                "Updated {changes} on {records}; {} of {} updates failed",
                self.failures.len(),
                self.attempted()
            )
        }
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Applies patches to the current selection through a sink.
pub struct BulkCoordinator<'a, S: FieldUpdateSink + ?Sized> {
    sink: &'a S,
}

impl<'a, S: FieldUpdateSink + ?Sized> BulkCoordinator<'a, S> {
    /// Coordinator writing through `sink`.
    pub fn new(sink: &'a S) -> Self {
        Self { sink }
    }

    /// Apply `patch` to every selected record, then clear the selection.
    ///
    /// Rejected without side effects when nothing is selected or the patch
    /// is empty.
    pub async fn apply(
        &self,
        selection: &mut SelectionSet,
        patch: &BulkPatch,
    ) -> Result<BulkOutcome, BulkError> {
        if selection.is_empty() {
            return Err(BulkError::NoSelection);
        }
        if patch.is_empty() {
            return Err(BulkError::NothingToApply);
        }
        let ids: Vec<RecordId> = selection.ids().cloned().collect();
        let outcome = self.run(&ids, patch).await;
        selection.clear();
        Ok(outcome)
    }

    /// Single-target action: write one field on exactly one selected record.
    pub async fn assign_single(
        &self,
        selection: &mut SelectionSet,
        field: &str,
        value: Value,
    ) -> Result<BulkOutcome, BulkError> {
        let Some(id) = selection.single().cloned() else {
            return Err(BulkError::RequiresSingleSelection {
                selected: selection.len(),
            });
        };
        let patch = BulkPatch {
            patch: [(field.to_string(), value)].into_iter().collect(),
            clear: Vec::new(),
        };
        let outcome = self.run(std::slice::from_ref(&id), &patch).await;
        selection.clear();
        Ok(outcome)
    }

    async fn run(&self, ids: &[RecordId], patch: &BulkPatch) -> BulkOutcome {
        let mut outcome = BulkOutcome {
            applied_count: ids.len(),
            change_count: patch.change_count(),
            failures: Vec::new(),
        };
        for id in ids {
            for (field, value) in patch.updates() {
                if let Err(error) = self.sink.update_field(id, field, value).await {
                    tracing::warn!(record = %id, field, error = %error, "Field update failed");
                    outcome.failures.push(FieldFailure {
                        record_id: id.clone(),
                        field: field.to_string(),
                        error,
                    });
                }
            }
        }
        tracing::info!(
            records = outcome.applied_count,
            changes = outcome.change_count,
            failures = outcome.failures.len(),
            "Bulk update finished"
        );
        outcome
    }
}

// ===== BulkEditSession =====

/// Phase of a bulk-edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No dialog open.
    #[default]
    Idle,
    /// Dialog open, every field unchanged.
    Open,
    /// At least one field intent was entered.
    Editing,
    /// Updates in flight.
    Applying,
}

/// Bulk-edit dialog lifecycle: `Idle → Open → Editing → Applying → Idle`.
///
/// Closing from any phase discards the field intents.
#[derive(Debug, Clone)]
pub struct BulkEditSession {
    phase: SessionPhase,
    builder: PatchBuilder,
}

impl BulkEditSession {
    /// New idle session over the given editable fields.
    pub fn new(builder: PatchBuilder) -> Self {
        Self {
            phase: SessionPhase::Idle,
            builder,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Field intents entered so far.
    pub fn builder(&self) -> &PatchBuilder {
        &self.builder
    }

    /// Open the dialog with every field reset. Only valid from `Idle`.
    pub fn open(&mut self) -> bool {
        if self.phase != SessionPhase::Idle {
            return false;
        }
        self.builder.reset();
        self.phase = SessionPhase::Open;
        true
    }

    fn editable(&self) -> bool {
        matches!(self.phase, SessionPhase::Open | SessionPhase::Editing)
    }

    /// Change a field's mode. Returns `false` outside Open/Editing or for an unknown field.
    pub fn set_mode(&mut self, key: &str, mode: FieldMode) -> bool {
        if !self.editable() || !self.builder.set_mode(key, mode) {
            return false;
        }
        self.phase = SessionPhase::Editing;
        true
    }

    /// Enter a value for a field, switching it to `Set`.
    pub fn set_value(&mut self, key: &str, value: Value) -> bool {
        if !self.editable() || !self.builder.set_value(key, value) {
            return false;
        }
        self.phase = SessionPhase::Editing;
        true
    }

    /// Close the dialog from any phase, discarding field intents.
    pub fn cancel(&mut self) {
        self.builder.reset();
        self.phase = SessionPhase::Idle;
    }

    /// Reduce the intents and apply them to the selection.
    ///
    /// Precondition failures leave the session where it was. Otherwise the
    /// session returns to `Idle` once the batch finishes, whatever its
    /// outcome.
    pub async fn apply<S: FieldUpdateSink + ?Sized>(
        &mut self,
        coordinator: &BulkCoordinator<'_, S>,
        selection: &mut SelectionSet,
    ) -> Result<BulkOutcome, BulkError> {
        if !self.editable() || !self.builder.can_apply() {
            return Err(BulkError::NothingToApply);
        }
        if selection.is_empty() {
            return Err(BulkError::NoSelection);
        }
        let previous = self.phase;
        self.phase = SessionPhase::Applying;
        let patch = self.builder.reduce();
        let result = coordinator.apply(selection, &patch).await;
        match result {
            Ok(_) => self.cancel(),
            Err(_) => self.phase = previous,
        }
        result
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
