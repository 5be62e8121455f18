//! Configuration file loading with precedence handling.

use crate::bulk::StaticOptions;
use crate::model::{CustomDocument, EntityConfig, EntityKind, SelectOption};
use crate::state::{VisibilityPolicy, DEFAULT_PAGE_SIZE, DEFAULT_VISIBLE_LIMIT};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "GRIDLINE_CONFIG";

/// Environment variable overriding the state file path.
pub const STATE_FILE_ENV_VAR: &str = "GRIDLINE_STATE_FILE";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/gridline/config.toml`.
///
/// ```toml
/// default_visible_limit = 12
/// page_size = 50
/// uncapped_entities = ["positions", "clients"]
///
/// [[documents.leads]]
/// key = "passport"
/// label = "Passport"
///
/// [options]
/// country = ["US", "DE", { label = "United Kingdom", value = "GB" }]
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Maximum number of columns visible on first load.
    #[serde(default)]
    pub default_visible_limit: Option<usize>,

    /// Rows per page.
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Path of the file-backed table state store.
    #[serde(default)]
    pub state_file: Option<PathBuf>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Entity kinds exempt from the visible column cap.
    #[serde(default)]
    pub uncapped_entities: Option<Vec<EntityKind>>,

    /// Custom document columns keyed by entity name.
    #[serde(default)]
    pub documents: Option<BTreeMap<String, Vec<CustomDocument>>>,

    /// Static option tables per field key.
    #[serde(default)]
    pub options: Option<BTreeMap<String, Vec<OptionEntry>>>,
}

/// One option in a static option table: a bare string or a label/value pair.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OptionEntry {
    /// Label equals value.
    Plain(String),
    /// Distinct label and value.
    Labeled(SelectOption),
}

impl From<OptionEntry> for SelectOption {
    fn from(entry: OptionEntry) -> Self {
        match entry {
            OptionEntry::Plain(value) => SelectOption::plain(value),
            OptionEntry::Labeled(option) => option,
        }
    }
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Maximum number of columns visible on first load.
    pub default_visible_limit: usize,
    /// Rows per page.
    pub page_size: usize,
    /// File-backed table state store.
    pub state_file: PathBuf,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Entity kinds exempt from the visible column cap.
    pub uncapped_entities: Vec<EntityKind>,
    /// Custom document columns per entity kind.
    pub documents: HashMap<EntityKind, Vec<CustomDocument>>,
    /// Static option tables per field key.
    pub options: BTreeMap<String, Vec<SelectOption>>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            default_visible_limit: DEFAULT_VISIBLE_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
            state_file: default_state_path(),
            log_file_path: default_log_path(),
            uncapped_entities: vec![EntityKind::Positions],
            documents: HashMap::new(),
            options: BTreeMap::new(),
        }
    }
}

impl ResolvedConfig {
    /// Visibility policy for one entity table.
    pub fn visibility_policy(&self, kind: EntityKind) -> VisibilityPolicy {
        VisibilityPolicy {
            limit: self.default_visible_limit,
            uncapped: self.uncapped_entities.contains(&kind),
        }
    }

    /// Custom document columns configured for an entity kind.
    pub fn documents_for(&self, kind: EntityKind) -> &[CustomDocument] {
        self.documents.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Static option table for an entity: schema options, overridden per
    /// field by configured tables.
    pub fn static_options(&self, entity: &EntityConfig) -> StaticOptions {
        let mut options = StaticOptions::from_config(entity);
        for (field, entries) in &self.options {
            options.insert(field.clone(), entries.clone());
        }
        options
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/gridline/gridline.log` on Unix-like systems,
/// or the platform equivalent; falls back to the current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("gridline").join("gridline.log")
    } else {
        PathBuf::from("gridline.log")
    }
}

/// Resolve default state store path.
///
/// Returns `~/.local/share/gridline/table-state.json` on Unix-like systems,
/// or the platform equivalent; falls back to the current directory.
pub fn default_state_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("gridline").join("table-state.json")
    } else {
        PathBuf::from("table-state.json")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path (`~/.config/gridline/config.toml`).
///
/// Returns `None` if the config directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gridline").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `GRIDLINE_CONFIG` environment variable
/// 3. Default path `~/.config/gridline/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides (`GRIDLINE_STATE_FILE`).
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(path) = std::env::var(STATE_FILE_ENV_VAR) {
        config.state_file = PathBuf::from(path);
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        default_visible_limit: config
            .default_visible_limit
            .unwrap_or(defaults.default_visible_limit),
        page_size: config.page_size.unwrap_or(defaults.page_size),
        state_file: config.state_file.unwrap_or(defaults.state_file),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        uncapped_entities: config
            .uncapped_entities
            .unwrap_or(defaults.uncapped_entities),
        documents: config
            .documents
            .map(resolve_documents)
            .unwrap_or(defaults.documents),
        options: config
            .options
            .map(|table| {
                table
                    .into_iter()
                    .map(|(field, entries)| {
                        (field, entries.into_iter().map(SelectOption::from).collect())
                    })
                    .collect()
            })
            .unwrap_or(defaults.options),
    }
}

fn resolve_documents(
    table: BTreeMap<String, Vec<CustomDocument>>,
) -> HashMap<EntityKind, Vec<CustomDocument>> {
    table
        .into_iter()
        .filter_map(|(entity, docs)| match entity.parse::<EntityKind>() {
            Ok(kind) => Some((kind, docs)),
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring documents for unknown entity");
                None
            }
        })
        .collect()
}

/// Apply CLI argument overrides to resolved config.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, page_size: Option<usize>) -> ResolvedConfig {
    if let Some(size) = page_size {
        config.page_size = size;
    }

    config
}

/// Full resolution: load with precedence, merge, then env and CLI overrides.
pub fn resolve(
    config_path: Option<PathBuf>,
    page_size: Option<usize>,
) -> Result<ResolvedConfig, ConfigError> {
    let file = load_config_with_precedence(config_path)?;
    let merged = apply_env_overrides(merge_config(file));
    Ok(apply_cli_overrides(merged, page_size))
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
