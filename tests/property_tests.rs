//! Property-based tests for engine invariants.
//!
//! Tests validate:
//! 1. Absent and blank filters match every record
//! 2. Unparsable comparison operands match no record
//! 3. Date-only equality ignores time of day
//! 4. Relative column moves preserve the order of every other column
//! 5. Reduced patches never list a field twice and omit unchanged fields
//! 6. A single record is never "mixed"
//! 7. Missing values sort last in both directions

use gridline::bulk::{is_mixed, FieldMode, PatchBuilder};
use gridline::filter::FilterEvaluator;
use gridline::model::{ColumnDef, ColumnId, ColumnSet, ColumnType, Record};
use gridline::state::column_order::move_relative;
use gridline::state::sort::sort_records;
use gridline::state::{Placement, SortKey};
use proptest::prelude::*;
use serde_json::{json, Value};

fn column(id: &str, column_type: ColumnType) -> ColumnDef {
    ColumnDef {
        id: ColumnId::new(id).unwrap(),
        header: id.to_string(),
        path: id.to_string(),
        column_type,
        default_visible: true,
    }
}

fn defs() -> ColumnSet {
    ColumnSet::new([
        column("name", ColumnType::Text),
        column("budget", ColumnType::Money),
        column("startDate", ColumnType::Date),
    ])
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
    ]
}

// ===== Property 1-3: Filter evaluation =====

proptest! {
    #[test]
    fn blank_filter_matches_every_record(name in scalar(), budget in scalar()) {
        let defs = defs();
        let evaluator = FilterEvaluator::new(&defs);
        let record = json!({"name": name, "budget": budget});
        for column_id in ["name", "budget", "startDate"] {
            prop_assert!(evaluator.matches(&record, column_id, None));
            prop_assert!(evaluator.matches(&record, column_id, Some(&json!(""))));
        }
    }

    #[test]
    fn unparsable_operand_matches_nothing(
        budget in scalar(),
        operand in "[a-zA-Z][a-zA-Z ]{0,8}",
        rel in prop::sample::select(vec!["eq", "ne", "gt", "gte", "lt", "lte"]),
    ) {
        let defs = defs();
        let evaluator = FilterEvaluator::new(&defs);
        let record = json!({"budget": budget});
        let filter = json!({"op": "cmp", "rel": rel, "val": operand});
        prop_assert!(!evaluator.matches(&record, "budget", Some(&filter)));
    }

    #[test]
    fn date_only_equality_ignores_time_of_day(
        day in 1u32..=28,
        hour in 0u32..24,
        minute in 0u32..60,
        second in 0u32..60,
    ) {
        let defs = defs();
        let evaluator = FilterEvaluator::new(&defs);
        let cell = format!("2024-03-{day:02}T{hour:02}:{minute:02}:{second:02}Z");
        let record = json!({"startDate": cell});
        let same_day = json!({"kind": "single", "rel": "eq", "value": format!("2024-03-{day:02}")});
        let other_day = json!({"kind": "single", "rel": "eq", "value": format!("2024-04-{day:02}")});
        prop_assert!(evaluator.matches(&record, "startDate", Some(&same_day)));
        prop_assert!(!evaluator.matches(&record, "startDate", Some(&other_day)));
    }
}

// ===== Property 4: Column reordering =====

proptest! {
    #[test]
    fn relative_move_preserves_other_columns(
        names in prop::collection::btree_set("[a-z]{1,6}", 2..10),
        pick in any::<prop::sample::Index>(),
        target in any::<prop::sample::Index>(),
        before in any::<bool>(),
    ) {
        let order: Vec<ColumnId> = names.iter().map(|n| ColumnId::new(n.as_str()).unwrap()).collect();
        let moved = pick.get(&order).clone();
        let target = target.get(&order).clone();
        let placement = if before { Placement::Before } else { Placement::After };

        let result = move_relative(&order, &moved, &target, placement);

        let others_before: Vec<&ColumnId> = order.iter().filter(|c| **c != moved).collect();
        let others_after: Vec<&ColumnId> = result.iter().filter(|c| **c != moved).collect();
        prop_assert_eq!(others_before, others_after);
        prop_assert_eq!(result.len(), order.len());
        if moved != target {
            let m = result.iter().position(|c| *c == moved).unwrap();
            let t = result.iter().position(|c| *c == target).unwrap();
            prop_assert_eq!(m + 1 == t, before);
            prop_assert_eq!(t + 1 == m, !before);
        }
    }
}

// ===== Property 5-6: Bulk edit =====

fn mode() -> impl Strategy<Value = FieldMode> {
    prop_oneof![Just(FieldMode::Keep), Just(FieldMode::Set), Just(FieldMode::Clear)]
}

proptest! {
    #[test]
    fn reduce_partitions_fields(modes in prop::collection::vec(mode(), 1..8)) {
        let keys: Vec<String> = (0..modes.len()).map(|i| format!("f{i}")).collect();
        let mut builder = PatchBuilder::open(keys.iter().map(String::as_str));
        for (key, mode) in keys.iter().zip(&modes) {
            builder.set_mode(key, *mode);
            if *mode == FieldMode::Set {
                builder.set_value(key, json!(key));
            }
        }
        let patch = builder.reduce();

        for (key, mode) in keys.iter().zip(&modes) {
            let in_patch = patch.patch.contains_key(key);
            let in_clear = patch.clear.contains(key);
            prop_assert!(!(in_patch && in_clear));
            prop_assert_eq!(in_patch, *mode == FieldMode::Set);
            prop_assert_eq!(in_clear, *mode == FieldMode::Clear);
        }
    }

    #[test]
    fn single_record_is_never_mixed(value in scalar(), path in "[a-z]{1,5}") {
        let record = Record::from_value(json!({"id": "1", "a": value})).unwrap();
        prop_assert!(!is_mixed(&path, &[&record]));
        prop_assert!(!is_mixed("a", &[&record]));
    }
}

// ===== Property 7: Sorting =====

proptest! {
    #[test]
    fn missing_values_sort_last(
        budgets in prop::collection::vec(prop::option::of(-1000i32..1000), 0..20),
        desc in any::<bool>(),
    ) {
        let records: Vec<Record> = budgets
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let mut data = json!({"id": i.to_string()});
                if let Some(b) = b {
                    data["budget"] = json!(b);
                }
                Record::from_value(data).unwrap()
            })
            .collect();
        let mut rows: Vec<&Record> = records.iter().collect();
        let id = ColumnId::new("budget").unwrap();
        let key = if desc { SortKey::desc(id) } else { SortKey::asc(id) };

        sort_records(&mut rows, &[key], &defs());

        let values: Vec<Option<f64>> = rows.iter().map(|r| r.data()["budget"].as_f64()).collect();
        let first_missing = values.iter().position(Option::is_none).unwrap_or(values.len());
        prop_assert!(values[first_missing..].iter().all(Option::is_none));
        let present: Vec<f64> = values[..first_missing].iter().flatten().copied().collect();
        for pair in present.windows(2) {
            if desc {
                prop_assert!(pair[0] >= pair[1]);
            } else {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }
}
