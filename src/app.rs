//! Command runners behind the `gridline` binary.
//!
//! Each runner takes already-loaded records and resolved configuration and
//! writes its output to the given writer, so the whole command surface is
//! testable without a process boundary.

use crate::bulk::{
    editable_fields, placeholder, resolve_options, BulkCoordinator, BulkEditSession, BulkOutcome,
    FieldMode, PatchBuilder, StaticOptions,
};
use crate::config::ResolvedConfig;
use crate::model::error::AppError;
use crate::model::{
    ColumnDef, ColumnId, ColumnSet, ColumnType, EntityConfig, EntityKind, Record, RecordError,
    RecordId,
};
use crate::persist::{FileStore, KeyValueStore, PersistentTable};
use crate::source::{RecordSet, SharedRecordSet};
use crate::state::{RowModel, SelectionSet, SortKey, TableAction, TableState, VisibilityMap};
use crate::view;
use serde_json::Value;
use std::io::Write;

/// Everything a command needs to know about the table it operates on.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Resolved configuration.
    pub config: ResolvedConfig,
    /// Entity schema.
    pub entity: EntityConfig,
    /// Columns derived from the schema and configured documents.
    pub columns: ColumnSet,
}

impl AppContext {
    /// Build the context for one entity kind.
    pub fn new(config: ResolvedConfig, kind: EntityKind) -> Self {
        let entity = EntityConfig::builtin(kind);
        let columns = entity.derive_columns(config.documents_for(kind));
        Self {
            config,
            entity,
            columns,
        }
    }

    /// Look up a data column by id, rejecting the selection column.
    pub fn data_column(&self, id: &str) -> Result<&ColumnDef, AppError> {
        self.columns
            .get(id)
            .filter(|c| c.is_data_column())
            .ok_or_else(|| AppError::InvalidArgument(format!("unknown column '{id}'")))
    }
}

// ===== Argument parsing helpers =====

/// Split `key=value`, reading the value as JSON and falling back to a plain
/// string when it is not valid JSON (`status=HOT` and `status="HOT"` agree).
pub fn parse_assignment(raw: &str) -> Result<(String, Value), AppError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| AppError::InvalidArgument(format!("expected key=value, got '{raw}'")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::InvalidArgument(format!("missing key in '{raw}'")));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Parse `column` or `column:asc` / `column:desc`.
pub fn parse_sort_key(raw: &str) -> Result<SortKey, AppError> {
    let (column, direction) = match raw.rsplit_once(':') {
        Some((column, direction)) => (column, Some(direction)),
        None => (raw, None),
    };
    let id = ColumnId::new(column.trim())
        .map_err(|e| AppError::InvalidArgument(format!("sort '{raw}': {e}")))?;
    match direction.map(str::to_ascii_lowercase).as_deref() {
        None | Some("asc") => Ok(SortKey::asc(id)),
        Some("desc") => Ok(SortKey::desc(id)),
        Some(other) => Err(AppError::InvalidArgument(format!(
            "sort direction must be asc or desc, got '{other}'"
        ))),
    }
}

// ===== view =====

/// Options of the `view` command.
#[derive(Debug, Clone, Default)]
pub struct ViewRequest {
    /// Column filters as `(column, raw payload)`. When non-empty they replace
    /// any persisted filters.
    pub filters: Vec<(String, Value)>,
    /// Sort keys in priority order. When non-empty they replace the
    /// persisted sort.
    pub sort: Vec<SortKey>,
    /// Quick-search text.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<usize>,
    /// Explicit visible column ids.
    pub columns: Option<Vec<String>>,
    /// Persist the resulting layout and visibility.
    pub save: bool,
}

impl ViewRequest {
    fn actions(&self, ctx: &AppContext) -> Result<Vec<TableAction>, AppError> {
        let mut actions = Vec::new();
        if !self.filters.is_empty() {
            actions.push(TableAction::ClearFilters);
            for (column, value) in &self.filters {
                let id = ctx.data_column(column)?.id.clone();
                actions.push(TableAction::SetFilter {
                    id,
                    value: value.clone(),
                });
            }
        }
        if !self.sort.is_empty() {
            for key in &self.sort {
                ctx.data_column(key.id.as_str())?;
            }
            actions.push(TableAction::SetSort(self.sort.clone()));
        }
        if let Some(search) = &self.search {
            actions.push(TableAction::SetGlobalFilter(search.clone()));
        }
        if let Some(page) = self.page {
            actions.push(TableAction::SetPage(page.saturating_sub(1)));
        }
        Ok(actions)
    }

    fn visibility_override(&self, ctx: &AppContext) -> Result<Option<VisibilityMap>, AppError> {
        let Some(wanted) = &self.columns else {
            return Ok(None);
        };
        for id in wanted {
            ctx.data_column(id)?;
        }
        let map = ctx
            .columns
            .all()
            .iter()
            .map(|c| {
                let visible = c.is_select() || wanted.iter().any(|w| w == c.id.as_str());
                (c.id.clone(), visible)
            })
            .collect();
        Ok(Some(map))
    }
}

/// Render one page of `records` under the stored layout plus the request's
/// overrides.
pub fn run_view<W: Write>(
    ctx: &AppContext,
    records: &[Record],
    request: &ViewRequest,
    out: &mut W,
) -> Result<(), AppError> {
    let mut store = FileStore::open(&ctx.config.state_file);
    let state = build_view_state(ctx, &mut store, request)?;

    let model = RowModel::compute(records, &state);
    let columns = state.visible_columns();
    write!(out, "{}", view::render_table(&columns, &model.rows))?;
    writeln!(
        out,
        "{}",
        view::render_footer(&model, state.pagination.page_size)
    )?;
    Ok(())
}

/// Restore the stored layout for the entity and apply the request on top.
///
/// With `save` the changes are written through to `store`; otherwise the
/// store is only read.
pub fn build_view_state<S: KeyValueStore>(
    ctx: &AppContext,
    store: S,
    request: &ViewRequest,
) -> Result<TableState, AppError> {
    let visibility = request.visibility_override(ctx)?;
    let actions = request.actions(ctx)?;
    let mut table = PersistentTable::open(
        store,
        ctx.entity.storage_key.clone(),
        ctx.columns.clone(),
        ctx.config.visibility_policy(ctx.entity.kind),
        ctx.config.page_size,
        visibility.as_ref(),
    );

    if request.save {
        for action in actions {
            table.dispatch(action)?;
        }
        table.save()?;
        tracing::info!(namespace = %table.storage().state_key(), "Saved table layout");
        Ok(table.into_state())
    } else {
        let mut state = table.into_state();
        for action in actions {
            state.apply(action);
        }
        Ok(state)
    }
}

// ===== edit / assign =====

/// Options of the `edit` command.
#[derive(Debug, Clone, Default)]
pub struct EditRequest {
    /// Records to edit.
    pub ids: Vec<String>,
    /// Fields to set, with their new values.
    pub set: Vec<(String, Value)>,
    /// Fields to clear.
    pub clear: Vec<String>,
}

fn selection_from(ids: &[String]) -> Result<SelectionSet, AppError> {
    ids.iter()
        .map(|raw| RecordId::new(raw.trim()).map_err(|e| AppError::from(RecordError::from(e))))
        .collect()
}

/// Apply a bulk edit and return the outcome together with the edited records.
pub async fn run_edit(
    ctx: &AppContext,
    records: Vec<Record>,
    request: &EditRequest,
) -> Result<(BulkOutcome, Vec<Record>), AppError> {
    if let Some((key, _)) = request.set.iter().find(|(key, _)| request.clear.contains(key)) {
        return Err(AppError::InvalidArgument(format!(
            "'{key}' cannot be both set and cleared"
        )));
    }

    let mut selection = selection_from(&request.ids)?;
    let mut session = BulkEditSession::new(PatchBuilder::for_columns(&ctx.columns));
    session.open();

    for (key, value) in &request.set {
        if !session.set_value(key, value.clone()) {
            return Err(not_editable(key));
        }
    }
    for key in &request.clear {
        if !session.set_mode(key, FieldMode::Clear) {
            return Err(not_editable(key));
        }
    }

    let shared = SharedRecordSet::new(RecordSet::new(records)).with_columns(&ctx.columns);
    let coordinator = BulkCoordinator::new(&shared);
    let outcome = session.apply(&coordinator, &mut selection).await?;
    Ok((outcome, shared.snapshot().into_records()))
}

/// Write one field on exactly one record.
pub async fn run_assign(
    ctx: &AppContext,
    records: Vec<Record>,
    ids: &[String],
    field: &str,
    value: Value,
) -> Result<(BulkOutcome, Vec<Record>), AppError> {
    if !editable_fields(&ctx.columns)
        .iter()
        .any(|c| c.id.as_str() == field)
    {
        return Err(not_editable(field));
    }
    let mut selection = selection_from(ids)?;
    let shared = SharedRecordSet::new(RecordSet::new(records)).with_columns(&ctx.columns);
    let coordinator = BulkCoordinator::new(&shared);
    let outcome = coordinator
        .assign_single(&mut selection, field, value)
        .await?;
    Ok((outcome, shared.snapshot().into_records()))
}

fn not_editable(key: &str) -> AppError {
    AppError::InvalidArgument(format!("'{key}' is not an editable field"))
}

/// Print each editable field's current value across the selected records
/// ("Mixed values" when they disagree) and the options offered for choice
/// fields.
pub fn run_preview<W: Write>(
    ctx: &AppContext,
    records: &[Record],
    ids: &[String],
    out: &mut W,
) -> Result<(), AppError> {
    let selection = selection_from(ids)?;
    let selected: Vec<&Record> = records
        .iter()
        .filter(|r| selection.contains(r.id()))
        .collect();
    if selected.is_empty() {
        return Err(crate::bulk::BulkError::NoSelection.into());
    }

    let static_options: StaticOptions = ctx.config.static_options(&ctx.entity);
    for column in editable_fields(&ctx.columns) {
        let current = placeholder(&column.path, &selected).unwrap_or_default();
        writeln!(out, "{}: {}", column.id, current)?;
        if matches!(column.column_type, ColumnType::Select | ColumnType::Status) {
            let options = resolve_options(None, &static_options, column.id.as_str());
            if !options.is_empty() {
                let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                writeln!(out, "  options: {}", values.join(", "))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
