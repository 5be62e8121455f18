//! Tests for the bulk coordinator and bulk-edit session.

use super::*;
use serde_json::json;
use std::sync::Mutex;

fn rid(raw: &str) -> RecordId {
    RecordId::new(raw).unwrap()
}

/// Records every call; fails updates to fields listed in `failing`.
#[derive(Default)]
struct RecordingSink {
    calls: Mutex<Vec<(String, String, Value)>>,
    failing: Vec<&'static str>,
}

impl RecordingSink {
    fn failing(fields: &[&'static str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: fields.to_vec(),
        }
    }

    fn calls(&self) -> Vec<(String, String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FieldUpdateSink for RecordingSink {
    async fn update_field(
        &self,
        id: &RecordId,
        field: &str,
        value: Value,
    ) -> Result<(), UpdateError> {
        self.calls
            .lock()
            .unwrap()
            .push((id.to_string(), field.to_string(), value));
        if self.failing.iter().any(|f| *f == field) {
            return Err(UpdateError::Rejected(format!("{field} is locked")));
        }
        Ok(())
    }
}

fn selection(ids: &[&str]) -> SelectionSet {
    ids.iter().map(|s| rid(s)).collect()
}

fn country_patch() -> BulkPatch {
    let mut builder = PatchBuilder::open(["country", "status"]);
    builder.set_value("country", json!("US"));
    builder.reduce()
}

// ===== apply =====

#[tokio::test]
async fn apply_issues_one_update_per_record_and_field() {
    let sink = RecordingSink::default();
    let coordinator = BulkCoordinator::new(&sink);
    let mut sel = selection(&["1", "2", "3"]);

    let outcome = coordinator.apply(&mut sel, &country_patch()).await.unwrap();

    assert_eq!(outcome.applied_count, 3);
    assert_eq!(outcome.change_count, 1);
    assert!(outcome.is_success());
    assert_eq!(outcome.summary(), "Updated 1 field on 3 records");
    let calls = sink.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|(_, f, v)| f == "country" && v == &json!("US")));
    assert!(sel.is_empty());
}

#[tokio::test]
async fn clear_fields_are_written_as_null() {
    let sink = RecordingSink::default();
    let coordinator = BulkCoordinator::new(&sink);
    let mut sel = selection(&["1"]);
    let patch = BulkPatch {
        patch: Default::default(),
        clear: vec!["status".into()],
    };

    coordinator.apply(&mut sel, &patch).await.unwrap();
    assert_eq!(
        sink.calls(),
        vec![("1".to_string(), "status".to_string(), Value::Null)]
    );
}

#[tokio::test]
async fn partial_failures_are_collected_without_rollback() {
    let sink = RecordingSink::failing(&["status"]);
    let coordinator = BulkCoordinator::new(&sink);
    let mut sel = selection(&["1", "2"]);
    let mut builder = PatchBuilder::open(["country", "status"]);
    builder.set_value("country", json!("DE"));
    builder.set_mode("status", FieldMode::Clear);

    let outcome = coordinator.apply(&mut sel, &builder.reduce()).await.unwrap();

    assert_eq!(sink.calls().len(), 4);
    assert_eq!(outcome.failures.len(), 2);
    assert!(outcome.failures.iter().all(|f| f.field == "status"));
    assert_eq!(
        outcome.summary(),
        "Updated 2 fields on 2 records; 2 of 4 updates failed"
    );
    assert!(sel.is_empty());
}

#[tokio::test]
async fn empty_selection_is_rejected_before_any_update() {
    let sink = RecordingSink::default();
    let coordinator = BulkCoordinator::new(&sink);
    let mut sel = SelectionSet::new();
    let err = coordinator.apply(&mut sel, &country_patch()).await.unwrap_err();
    assert_eq!(err, BulkError::NoSelection);
    assert!(sink.calls().is_empty());
}

#[tokio::test]
async fn empty_patch_is_rejected_and_selection_kept() {
    let sink = RecordingSink::default();
    let coordinator = BulkCoordinator::new(&sink);
    let mut sel = selection(&["1"]);
    let err = coordinator
        .apply(&mut sel, &BulkPatch::default())
        .await
        .unwrap_err();
    assert_eq!(err, BulkError::NothingToApply);
    assert_eq!(sel.len(), 1);
    assert!(sink.calls().is_empty());
}

// ===== assign_single =====

#[tokio::test]
async fn assign_single_requires_exactly_one_record() {
    let sink = RecordingSink::default();
    let coordinator = BulkCoordinator::new(&sink);

    let mut two = selection(&["1", "2"]);
    let err = coordinator
        .assign_single(&mut two, "ownerName", json!("Ann"))
        .await
        .unwrap_err();
    assert_eq!(err, BulkError::RequiresSingleSelection { selected: 2 });
    assert_eq!(two.len(), 2);

    let mut none = SelectionSet::new();
    let err = coordinator
        .assign_single(&mut none, "ownerName", json!("Ann"))
        .await
        .unwrap_err();
    assert_eq!(err, BulkError::RequiresSingleSelection { selected: 0 });
    assert!(sink.calls().is_empty());

    let mut one = selection(&["7"]);
    let outcome = coordinator
        .assign_single(&mut one, "ownerName", json!("Ann"))
        .await
        .unwrap();
    assert_eq!(outcome.attempted(), 1);
    assert_eq!(
        sink.calls(),
        vec![("7".to_string(), "ownerName".to_string(), json!("Ann"))]
    );
}

#[test]
fn bulk_errors_read_as_user_messages() {
    assert_eq!(
        BulkError::RequiresSingleSelection { selected: 3 }.to_string(),
        "This action needs exactly one selected record (3 selected)"
    );
    assert_eq!(
        BulkError::NoSelection.to_string(),
        "Select at least one record first"
    );
}

// ===== BulkEditSession =====

#[test]
fn session_walks_idle_open_editing() {
    let mut session = BulkEditSession::new(PatchBuilder::open(["country"]));
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(!session.set_value("country", json!("US")));

    assert!(session.open());
    assert_eq!(session.phase(), SessionPhase::Open);
    assert!(!session.open());

    assert!(session.set_value("country", json!("US")));
    assert_eq!(session.phase(), SessionPhase::Editing);
}

#[test]
fn cancel_discards_intents_from_any_phase() {
    let mut session = BulkEditSession::new(PatchBuilder::open(["country"]));
    session.open();
    session.set_value("country", json!("US"));
    session.cancel();
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(!session.builder().can_apply());

    session.open();
    assert_eq!(session.builder().field("country").unwrap().value, None);
}

#[tokio::test]
async fn session_apply_returns_to_idle() {
    let sink = RecordingSink::default();
    let coordinator = BulkCoordinator::new(&sink);
    let mut sel = selection(&["1", "2", "3"]);
    let mut session = BulkEditSession::new(PatchBuilder::open(["country", "status"]));
    session.open();
    session.set_value("country", json!("US"));

    let outcome = session.apply(&coordinator, &mut sel).await.unwrap();
    assert_eq!(outcome.attempted(), 3);
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(!session.builder().can_apply());
}

#[tokio::test]
async fn session_apply_without_selection_stays_editing() {
    let sink = RecordingSink::default();
    let coordinator = BulkCoordinator::new(&sink);
    let mut sel = SelectionSet::new();
    let mut session = BulkEditSession::new(PatchBuilder::open(["country"]));
    session.open();
    session.set_value("country", json!("US"));

    let err = session.apply(&coordinator, &mut sel).await.unwrap_err();
    assert_eq!(err, BulkError::NoSelection);
    assert_eq!(session.phase(), SessionPhase::Editing);
    assert!(session.builder().can_apply());
}

#[tokio::test]
async fn session_apply_with_nothing_set_is_rejected() {
    let sink = RecordingSink::default();
    let coordinator = BulkCoordinator::new(&sink);
    let mut sel = selection(&["1"]);
    let mut session = BulkEditSession::new(PatchBuilder::open(["country"]));
    session.open();
    let err = session.apply(&coordinator, &mut sel).await.unwrap_err();
    assert_eq!(err, BulkError::NothingToApply);
    assert_eq!(session.phase(), SessionPhase::Open);
}
