//! Tests for the tri-state patch builder.

use super::*;
use crate::model::{EntityKind, FieldSchema};
use serde_json::json;

fn builder() -> PatchBuilder {
    PatchBuilder::open(["country", "status", "budget"])
}

fn record(value: Value) -> Record {
    Record::from_value(value).unwrap()
}

// ===== Mode transitions =====

#[test]
fn fields_start_unchanged_and_builder_cannot_apply() {
    let b = builder();
    assert!(b.keys().all(|k| b.field(k).unwrap().mode == FieldMode::Keep));
    assert!(!b.can_apply());
    assert!(b.reduce().is_empty());
}

#[test]
fn switching_to_set_preserves_entered_value() {
    let mut b = builder();
    b.set_value("country", json!("US"));
    b.set_mode("country", FieldMode::Set);
    assert_eq!(b.field("country").unwrap().value, Some(json!("US")));
}

#[test]
fn switching_away_from_set_discards_value() {
    let mut b = builder();
    b.set_value("country", json!("US"));
    b.set_mode("country", FieldMode::Clear);
    assert_eq!(b.field("country").unwrap().value, None);

    b.set_mode("country", FieldMode::Set);
    assert_eq!(b.field("country").unwrap().value, None);
}

#[test]
fn unknown_fields_are_rejected() {
    let mut b = builder();
    assert!(!b.set_mode("id", FieldMode::Set));
    assert!(!b.set_value("age", json!(3)));
    assert!(!b.can_apply());
}

// ===== Reduce =====

#[test]
fn reduce_splits_set_and_clear_and_omits_unchanged() {
    let mut b = builder();
    b.set_value("country", json!("US"));
    b.set_mode("status", FieldMode::Clear);

    let patch = b.reduce();
    assert_eq!(patch.patch, BTreeMap::from([("country".to_string(), json!("US"))]));
    assert_eq!(patch.clear, vec!["status".to_string()]);
    assert_eq!(patch.change_count(), 2);
    assert!(b.can_apply());
}

#[test]
fn set_without_value_writes_null() {
    let mut b = builder();
    b.set_mode("budget", FieldMode::Set);
    assert_eq!(b.reduce().patch.get("budget"), Some(&Value::Null));
}

#[test]
fn updates_issue_sets_before_clears() {
    let mut b = builder();
    b.set_mode("status", FieldMode::Clear);
    b.set_value("country", json!("US"));
    let patch = b.reduce();
    let updates: Vec<(&str, Value)> = patch.updates().collect();
    assert_eq!(updates, vec![("country", json!("US")), ("status", Value::Null)]);
}

#[test]
fn reset_returns_all_fields_to_keep() {
    let mut b = builder();
    b.set_value("country", json!("US"));
    b.reset();
    assert!(!b.can_apply());
    assert_eq!(b.field("country").unwrap().value, None);
}

// ===== Editable fields =====

#[test]
fn editable_fields_exclude_calculated_system_and_select() {
    let columns = EntityConfig::builtin(EntityKind::Leads).derive_columns(&[]);
    let keys: Vec<&str> = editable_fields(&columns).iter().map(|c| c.id.as_str()).collect();
    assert!(keys.contains(&"country"));
    assert!(keys.contains(&"status"));
    for excluded in ["select", "id", "createdAt", "age"] {
        assert!(!keys.contains(&excluded), "{excluded} should not be editable");
    }
}

// ===== Mixed values =====

#[test]
fn is_mixed_detects_disagreement() {
    let a = record(json!({"id": 1, "country": "US"}));
    let b = record(json!({"id": 2, "country": "DE"}));
    let c = record(json!({"id": 3, "country": "US"}));
    assert!(is_mixed("country", &[&a, &b]));
    assert!(!is_mixed("country", &[&a, &c]));
}

#[test]
fn is_mixed_is_false_for_a_single_record() {
    let a = record(json!({"id": 1, "country": "US", "owner": {"name": "Ann"}}));
    for path in ["country", "owner.name", "missing"] {
        assert!(!is_mixed(path, &[&a]));
    }
}

#[test]
fn missing_and_null_are_the_same_value() {
    let a = record(json!({"id": 1}));
    let b = record(json!({"id": 2, "country": null}));
    assert!(!is_mixed("country", &[&a, &b]));
}

#[test]
fn numbers_compare_by_value() {
    let a = record(json!({"id": 1, "budget": 1}));
    let b = record(json!({"id": 2, "budget": 1.0}));
    let c = record(json!({"id": 3, "budget": "1"}));
    assert!(!is_mixed("budget", &[&a, &b]));
    assert!(is_mixed("budget", &[&a, &c]));
}

#[test]
fn placeholder_shows_mixed_or_shared_value() {
    let a = record(json!({"id": 1, "country": "US"}));
    let b = record(json!({"id": 2, "country": "DE"}));
    let c = record(json!({"id": 3}));
    assert_eq!(placeholder("country", &[&a, &b]).as_deref(), Some(MIXED_PLACEHOLDER));
    assert_eq!(placeholder("country", &[&a]).as_deref(), Some("US"));
    assert_eq!(placeholder("country", &[&c]), None);
    assert_eq!(placeholder("country", &[]), None);
}

// ===== Options =====

struct LiveOptions;

impl OptionsProvider for LiveOptions {
    fn options_for(&self, field_key: &str) -> Option<Vec<SelectOption>> {
        match field_key {
            "status" => Some(vec![SelectOption::plain("LIVE")]),
            "source" => Some(Vec::new()),
            _ => None,
        }
    }
}

#[test]
fn live_options_win_and_static_table_is_fallback() {
    let config = EntityConfig {
        kind: EntityKind::Leads,
        storage_key: "t".into(),
        fields: vec![
            FieldSchema::new("status", "Status", ColumnType::Status).with_options(["NEW"]),
            FieldSchema::new("source", "Source", ColumnType::Select).with_options(["Web"]),
            FieldSchema::new("notes", "Notes", ColumnType::Text),
        ],
    };
    let fallback = StaticOptions::from_config(&config);
    let live = LiveOptions;

    let status = resolve_options(Some(&live), &fallback, "status");
    assert_eq!(status, vec![SelectOption::plain("LIVE")]);

    let source = resolve_options(Some(&live), &fallback, "source");
    assert_eq!(source, vec![SelectOption::plain("Web")]);

    let status_offline = resolve_options(None, &fallback, "status");
    assert_eq!(status_offline, vec![SelectOption::plain("NEW")]);

    assert!(resolve_options(Some(&live), &fallback, "notes").is_empty());
}
