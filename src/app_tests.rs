//! Tests for the command runners.

use super::*;
use crate::persist::MemoryStore;
use crate::source::parse_records;
use serde_json::json;

fn ctx() -> AppContext {
    let config = ResolvedConfig {
        state_file: std::env::temp_dir().join("gridline_app_tests/unused.json"),
        ..ResolvedConfig::default()
    };
    AppContext::new(config, EntityKind::Leads)
}

fn leads() -> Vec<Record> {
    parse_records(
        r#"[
  {"id": "1", "firstName": "Ann", "status": "NEW", "country": "US", "budget": 1200},
  {"id": "2", "firstName": "Bo", "status": "NEW", "country": "DE", "budget": 300},
  {"id": "3", "firstName": "Cy", "status": "HOT", "country": "US", "budget": 50000}
]"#,
    )
    .unwrap()
}

fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

// ===== argument helpers =====

#[test]
fn assignment_value_is_json_or_plain_text() {
    assert_eq!(
        parse_assignment("budget=1500").unwrap(),
        ("budget".to_string(), json!(1500))
    );
    assert_eq!(
        parse_assignment("status=HOT").unwrap(),
        ("status".to_string(), json!("HOT"))
    );
    assert_eq!(
        parse_assignment(r#"status={"op":"in","vals":["hot"]}"#).unwrap().1,
        json!({"op": "in", "vals": ["hot"]})
    );
    assert!(parse_assignment("no-equals").is_err());
    assert!(parse_assignment("=1").is_err());
}

#[test]
fn sort_key_parses_direction() {
    assert_eq!(
        parse_sort_key("budget").unwrap(),
        SortKey::asc(ColumnId::new("budget").unwrap())
    );
    assert_eq!(
        parse_sort_key("budget:DESC").unwrap(),
        SortKey::desc(ColumnId::new("budget").unwrap())
    );
    assert!(parse_sort_key("budget:sideways").is_err());
}

// ===== view =====

#[test]
fn view_state_applies_filters_sort_and_search() {
    let ctx = ctx();
    let request = ViewRequest {
        filters: vec![("country".into(), json!("us"))],
        sort: vec![SortKey::desc(ColumnId::new("budget").unwrap())],
        ..ViewRequest::default()
    };
    let state = build_view_state(&ctx, MemoryStore::new(), &request).unwrap();
    let records = leads();
    let model = RowModel::compute(&records, &state);
    let order: Vec<&str> = model.rows.iter().map(|r| r.id().as_str()).collect();
    assert_eq!(order, vec!["3", "1"]);
}

#[test]
fn view_rejects_unknown_columns() {
    let ctx = ctx();
    let request = ViewRequest {
        filters: vec![("shoeSize".into(), json!(9))],
        ..ViewRequest::default()
    };
    let err = build_view_state(&ctx, MemoryStore::new(), &request).unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[test]
fn saved_layout_is_restored_without_explicit_filters() {
    let ctx = ctx();
    let mut store = MemoryStore::new();
    let saving = ViewRequest {
        filters: vec![("status".into(), json!({"op": "in", "vals": ["hot"]}))],
        save: true,
        ..ViewRequest::default()
    };
    build_view_state(&ctx, &mut store, &saving).unwrap();

    let restored = build_view_state(&ctx, &mut store, &ViewRequest::default()).unwrap();
    let records = leads();
    let model = RowModel::compute(&records, &restored);
    assert_eq!(model.filtered_count, 1);
    assert_eq!(model.rows[0].id().as_str(), "3");

    let replaced = ViewRequest {
        filters: vec![("country".into(), json!("de"))],
        ..ViewRequest::default()
    };
    let state = build_view_state(&ctx, &mut store, &replaced).unwrap();
    assert_eq!(RowModel::compute(&records, &state).rows[0].id().as_str(), "2");
}

#[test]
fn unsaved_view_leaves_store_untouched() {
    let ctx = ctx();
    let mut store = MemoryStore::new();
    let request = ViewRequest {
        search: Some("ann".into()),
        filters: vec![("country".into(), json!("us"))],
        ..ViewRequest::default()
    };
    build_view_state(&ctx, &mut store, &request).unwrap();
    assert!(store.is_empty());
}

#[test]
fn columns_override_limits_visible_columns() {
    let ctx = ctx();
    let request = ViewRequest {
        columns: Some(ids(&["firstName", "budget"])),
        ..ViewRequest::default()
    };
    let state = build_view_state(&ctx, MemoryStore::new(), &request).unwrap();
    let visible: Vec<&str> = state
        .visible_columns()
        .iter()
        .filter(|c| c.is_data_column())
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(visible, vec!["firstName", "budget"]);
}

#[test]
fn run_view_renders_table_and_footer() {
    let ctx = ctx();
    let request = ViewRequest {
        columns: Some(ids(&["firstName", "budget"])),
        page: Some(1),
        ..ViewRequest::default()
    };
    let mut out = Vec::new();
    run_view(&ctx, &leads(), &request, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("First name  Budget"));
    assert!(text.contains("$50,000.00"));
    assert!(text.trim_end().ends_with("Rows 1-3 of 3 (page 1/1)"));
}

// ===== edit =====

#[tokio::test]
async fn edit_sets_field_on_every_selected_record() {
    let ctx = ctx();
    let request = EditRequest {
        ids: ids(&["1", "2", "3"]),
        set: vec![("country".into(), json!("CA"))],
        clear: vec![],
    };
    let (outcome, records) = run_edit(&ctx, leads(), &request).await.unwrap();
    assert_eq!(outcome.attempted(), 3);
    assert!(outcome.is_success());
    assert!(records.iter().all(|r| r.data()["country"] == json!("CA")));
}

#[tokio::test]
async fn edit_clear_writes_null_and_nested_paths_resolve() {
    let ctx = ctx();
    let request = EditRequest {
        ids: ids(&["2"]),
        set: vec![("ownerName".into(), json!("Dana"))],
        clear: vec!["status".into()],
    };
    let (_, records) = run_edit(&ctx, leads(), &request).await.unwrap();
    let bo = records.iter().find(|r| r.id().as_str() == "2").unwrap();
    assert_eq!(bo.data()["status"], Value::Null);
    assert_eq!(bo.data()["owner"]["name"], json!("Dana"));
}

#[tokio::test]
async fn edit_rejects_read_only_fields() {
    let ctx = ctx();
    let request = EditRequest {
        ids: ids(&["1"]),
        set: vec![("createdAt".into(), json!("2024-01-01"))],
        clear: vec![],
    };
    let err = run_edit(&ctx, leads(), &request).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[tokio::test]
async fn edit_rejects_setting_and_clearing_the_same_field() {
    let ctx = ctx();
    let request = EditRequest {
        ids: ids(&["1"]),
        set: vec![("country".into(), json!("FR"))],
        clear: vec!["country".into()],
    };
    let err = run_edit(&ctx, leads(), &request).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(ref msg) if msg.contains("country")));
}

#[tokio::test]
async fn edit_without_changes_is_rejected() {
    let ctx = ctx();
    let request = EditRequest {
        ids: ids(&["1"]),
        ..EditRequest::default()
    };
    let err = run_edit(&ctx, leads(), &request).await.unwrap_err();
    assert!(matches!(err, AppError::Bulk(crate::bulk::BulkError::NothingToApply)));
}

#[tokio::test]
async fn edit_reports_unknown_records_as_failures() {
    let ctx = ctx();
    let request = EditRequest {
        ids: ids(&["1", "404"]),
        set: vec![("country".into(), json!("FR"))],
        clear: vec![],
    };
    let (outcome, _) = run_edit(&ctx, leads(), &request).await.unwrap();
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].record_id.as_str(), "404");
}

#[tokio::test]
async fn assign_requires_a_single_record() {
    let ctx = ctx();
    let err = run_assign(&ctx, leads(), &ids(&["1", "2"]), "ownerName", json!("Eve"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Bulk(crate::bulk::BulkError::RequiresSingleSelection { selected: 2 })
    ));

    let (outcome, records) = run_assign(&ctx, leads(), &ids(&["1"]), "ownerName", json!("Eve"))
        .await
        .unwrap();
    assert_eq!(outcome.attempted(), 1);
    assert_eq!(records[0].data()["owner"]["name"], json!("Eve"));
}

#[test]
fn preview_shows_mixed_values_and_options() {
    let ctx = ctx();
    let mut out = Vec::new();
    run_preview(&ctx, &leads(), &ids(&["1", "2"]), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("status: NEW\n"));
    assert!(text.contains("country: Mixed values\n"));
    assert!(text.contains("  options: NEW, HOT, WARM, COLD, CONVERTED\n"));
    assert!(!text.contains("createdAt"));
}

#[test]
fn preview_requires_selected_records() {
    let ctx = ctx();
    let err = run_preview(&ctx, &leads(), &ids(&["404"]), &mut Vec::new()).unwrap_err();
    assert!(matches!(err, AppError::Bulk(crate::bulk::BulkError::NoSelection)));
}
