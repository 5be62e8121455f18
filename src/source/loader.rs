//! Loading records from a file or piped stdin.
//!
//! Input is either one JSON array of objects or JSON lines (one object per
//! line, blank lines skipped). Each object must carry an `id`.

use crate::model::error::InputError;
use crate::model::Record;
use serde_json::Value;
use std::io::{IsTerminal, Read};
use std::path::Path;

/// Load records from `path`, or from stdin when no path is given.
///
/// # Errors
///
/// - `FileNotFound` if `path` does not exist
/// - `NoInput` if no path is given and stdin is an interactive terminal
/// - `InvalidJson` / `InvalidRecord` for malformed content
pub fn load_records(path: Option<&Path>) -> Result<Vec<Record>, InputError> {
    let text = match path {
        Some(path) => {
            if !path.exists() {
                return Err(InputError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            std::fs::read_to_string(path)?
        }
        None => {
            let stdin = std::io::stdin();
            if stdin.is_terminal() {
                return Err(InputError::NoInput);
            }
            let mut text = String::new();
            stdin.lock().read_to_string(&mut text)?;
            text
        }
    };
    let records = parse_records(&text)?;
    tracing::info!(count = records.len(), "Loaded records");
    Ok(records)
}

/// Parse a JSON array or JSON-lines document into records.
pub fn parse_records(text: &str) -> Result<Vec<Record>, InputError> {
    let values = if text.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<Value>>(text).map_err(|e| InputError::InvalidJson {
            line: e.line(),
            message: e.to_string(),
        })?
    } else {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str::<Value>(line).map_err(|e| InputError::InvalidJson {
                    line: index + 1,
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            Record::from_value(value).map_err(|source| InputError::InvalidRecord { index, source })
        })
        .collect()
}

/// Write records to `path` as a pretty-printed JSON array.
pub fn save_records(path: &Path, records: &[Record]) -> std::io::Result<()> {
    let values: Vec<&Value> = records.iter().map(Record::data).collect();
    let text = serde_json::to_string_pretty(&values)?;
    std::fs::write(path, text + "\n")
}
