//! Field schema registry and per-entity table configuration.
//!
//! The registry maps a field key to its type, accessor path and options.
//! Column definitions are derived from it once per table instance.

use super::column::{ColumnDef, ColumnSet, ColumnType};
use super::identifiers::{ColumnId, InvalidColumnId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One selectable option of an enum/select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Display label.
    pub label: String,
    /// Stored value.
    pub value: String,
}

impl SelectOption {
    /// Option whose label equals its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// Schema entry for one record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    /// Field key, also used as the column id.
    pub key: String,
    /// Header label.
    pub label: String,
    /// Value type.
    #[serde(rename = "type")]
    pub field_type: ColumnType,
    /// Accessor path; defaults to `key`.
    #[serde(default)]
    pub path: Option<String>,
    /// Static options for select/status fields.
    #[serde(default)]
    pub options: Vec<SelectOption>,
    /// Whether the column starts visible.
    #[serde(default = "default_true")]
    pub default_visible: bool,
}

fn default_true() -> bool {
    true
}

impl FieldSchema {
    /// Schema entry whose path equals its key.
    pub fn new(key: impl Into<String>, label: impl Into<String>, field_type: ColumnType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type,
            path: None,
            options: Vec::new(),
            default_visible: true,
        }
    }

    /// Override the accessor path.
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach static options.
    pub fn with_options<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = values.into_iter().map(SelectOption::plain).collect();
        self
    }

    /// Start hidden.
    pub fn hidden(mut self) -> Self {
        self.default_visible = false;
        self
    }

    /// Effective accessor path.
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.key)
    }

    /// Convert into a column definition.
    pub fn to_column(&self) -> Result<ColumnDef, InvalidColumnId> {
        Ok(ColumnDef {
            id: ColumnId::new(self.key.clone())?,
            header: self.label.clone(),
            path: self.path().to_string(),
            column_type: self.field_type,
            default_visible: self.default_visible,
        })
    }
}

/// A dynamically appended "custom document" verification column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomDocument {
    /// Document key, e.g. `passport`.
    pub key: String,
    /// Header label.
    pub label: String,
}

impl CustomDocument {
    /// Column id under which the document is displayed.
    pub fn column_id(&self) -> String {
        format!("doc_{}", self.key)
    }

    fn to_column(&self) -> Result<ColumnDef, InvalidColumnId> {
        Ok(ColumnDef {
            id: ColumnId::new(self.column_id())?,
            header: self.label.clone(),
            path: format!("documents.{}.verified", self.key),
            column_type: ColumnType::VerificationCheckbox,
            default_visible: true,
        })
    }
}

/// Entity types that share the table engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Leads table.
    Leads,
    /// Clients table.
    Clients,
    /// Positions table.
    Positions,
}

impl EntityKind {
    /// Lowercase name used in config and storage keys.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Leads => "leads",
            EntityKind::Clients => "clients",
            EntityKind::Positions => "positions",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing an [`EntityKind`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown entity kind '{0}' (expected leads, clients or positions)")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leads" | "lead" => Ok(EntityKind::Leads),
            "clients" | "client" => Ok(EntityKind::Clients),
            "positions" | "position" => Ok(EntityKind::Positions),
            other => Err(UnknownEntityKind(other.to_string())),
        }
    }
}

/// Injected configuration for one entity table.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityConfig {
    /// Which entity this table renders.
    pub kind: EntityKind,
    /// Storage namespace for persisted table state.
    pub storage_key: String,
    /// Field schema registry, in default column order.
    pub fields: Vec<FieldSchema>,
}

impl EntityConfig {
    /// Built-in configuration for an entity kind.
    pub fn builtin(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Leads => Self::leads(),
            EntityKind::Clients => Self::clients(),
            EntityKind::Positions => Self::positions(),
        }
    }

    /// Look up a field by key.
    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Derive the immutable column set: selection column, schema fields,
    /// then one verification column per custom document.
    ///
    /// Fields with invalid (empty) keys are skipped with a warning.
    pub fn derive_columns(&self, documents: &[CustomDocument]) -> ColumnSet {
        let fields = self.fields.iter().filter_map(|f| match f.to_column() {
            Ok(c) => Some(c),
            Err(err) => {
                tracing::warn!(entity = %self.kind, error = %err, "Skipping field with invalid key");
                None
            }
        });
        let docs = documents.iter().filter_map(|d| match d.to_column() {
            Ok(c) => Some(c),
            Err(err) => {
                tracing::warn!(entity = %self.kind, error = %err, "Skipping invalid custom document");
                None
            }
        });
        ColumnSet::new(fields.chain(docs))
    }

    fn leads() -> Self {
        use ColumnType::*;
        Self {
            kind: EntityKind::Leads,
            storage_key: "table:leads".to_string(),
            fields: vec![
                FieldSchema::new("id", "ID", Text).hidden(),
                FieldSchema::new("firstName", "First name", Text),
                FieldSchema::new("lastName", "Last name", Text),
                FieldSchema::new("email", "Email", Text),
                FieldSchema::new("phone", "Phone", Phone),
                FieldSchema::new("country", "Country", Select),
                FieldSchema::new("status", "Status", Status)
                    .with_options(["NEW", "HOT", "WARM", "COLD", "CONVERTED"]),
                FieldSchema::new("source", "Source", Select)
                    .with_options(["Website", "Referral", "Campaign", "Event"]),
                FieldSchema::new("ownerName", "Owner", Text).at("owner.name"),
                FieldSchema::new("rating", "Rating", Rating),
                FieldSchema::new("budget", "Budget", Money),
                FieldSchema::new("probability", "Probability", Percentage),
                FieldSchema::new("isVerified", "Verified", Boolean),
                FieldSchema::new("dateOfBirth", "Date of birth", Date),
                FieldSchema::new("age", "Age", Calculated),
                FieldSchema::new("nextFollowUp", "Next follow-up", DateTime),
                FieldSchema::new("createdAt", "Created", DateTime),
                FieldSchema::new("notes", "Notes", Text).hidden(),
            ],
        }
    }

    fn clients() -> Self {
        use ColumnType::*;
        Self {
            kind: EntityKind::Clients,
            storage_key: "table:clients".to_string(),
            fields: vec![
                FieldSchema::new("id", "ID", Text).hidden(),
                FieldSchema::new("companyName", "Company", Text),
                FieldSchema::new("contactName", "Contact", Text),
                FieldSchema::new("email", "Email", Text),
                FieldSchema::new("phone", "Phone", Phone),
                FieldSchema::new("country", "Country", Select),
                FieldSchema::new("industry", "Industry", Select)
                    .with_options(["Finance", "Healthcare", "Retail", "Technology"]),
                FieldSchema::new("status", "Status", Status)
                    .with_options(["ACTIVE", "PAUSED", "CHURNED"]),
                FieldSchema::new("accountManager", "Account manager", Text)
                    .at("accountManager.name"),
                FieldSchema::new("revenue", "Revenue", Money),
                FieldSchema::new("discount", "Discount", Percentage),
                FieldSchema::new("rating", "Rating", Rating),
                FieldSchema::new("active", "Active", Boolean),
                FieldSchema::new("contractEndDate", "Contract end", Date),
                FieldSchema::new("onboardedAt", "Onboarded", DateTime),
                FieldSchema::new("tenureYears", "Tenure", Calculated),
                FieldSchema::new("createdAt", "Created", DateTime),
            ],
        }
    }

    fn positions() -> Self {
        use ColumnType::*;
        Self {
            kind: EntityKind::Positions,
            storage_key: "table:positions".to_string(),
            fields: vec![
                FieldSchema::new("id", "ID", Text).hidden(),
                FieldSchema::new("title", "Title", Text),
                FieldSchema::new("department", "Department", Select)
                    .with_options(["Engineering", "Sales", "Marketing", "Operations"]),
                FieldSchema::new("location", "Location", Text),
                FieldSchema::new("status", "Status", Status)
                    .with_options(["OPEN", "ON_HOLD", "FILLED", "CLOSED"]),
                FieldSchema::new("hiringManager", "Hiring manager", Text)
                    .at("hiringManager.name"),
                FieldSchema::new("salaryMin", "Salary min", Money),
                FieldSchema::new("salaryMax", "Salary max", Money),
                FieldSchema::new("headcount", "Headcount", Number),
                FieldSchema::new("remote", "Remote", Boolean),
                FieldSchema::new("startDate", "Start date", Date),
                FieldSchema::new("postedAt", "Posted", DateTime),
                FieldSchema::new("createdAt", "Created", DateTime),
            ],
        }
    }
}
