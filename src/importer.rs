//! Import normalizer
//!
//! Turns pasted text or an uploaded file into the list of parameter records
//! sent to `import_parameters`. Text is tried as strict JSON first, then YAML;
//! files are parsed by their declared media type.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

pub const MEDIA_JSON: &str = "application/json";
pub const MEDIA_YAML: &str = "application/yaml";
pub const MEDIA_OTHER: &str = "application/octet-stream";

/// Raw import input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    /// Text pasted by the operator
    Text(String),

    /// Uploaded file with its declared media type
    File {
        name: String,
        media_type: String,
        content: Vec<u8>,
    },
}

impl ImportSource {
    /// Read a file from disk, deriving the media type from its extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|e| Error::IoRead {
            path: PathBuf::from(path),
            source: e,
        })?;

        Ok(ImportSource::File {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            media_type: media_type_for_path(path).to_string(),
            content,
        })
    }

    /// Short label for logs and notices
    pub fn describe(&self) -> String {
        match self {
            ImportSource::Text(text) => format!("pasted text ({} bytes)", text.len()),
            ImportSource::File { name, media_type, .. } => format!("{} ({})", name, media_type),
        }
    }
}

/// Media type for a file, by extension
pub fn media_type_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("json") => MEDIA_JSON,
        Some("yaml") | Some("yml") => MEDIA_YAML,
        _ => MEDIA_OTHER,
    }
}

/// Parse an import source into records.
///
/// A top-level mapping is one record, a top-level list is one record per
/// element. Empty input is `EmptyImport`, unparseable input is `ImportParse`
/// and a parsed value of any other shape is `ImportShape`.
pub fn normalize(source: &ImportSource) -> Result<Vec<Map<String, Value>>> {
    let value = match source {
        ImportSource::Text(text) => {
            if text.trim().is_empty() {
                return Err(Error::EmptyImport);
            }
            parse_text(text)?
        }
        ImportSource::File {
            name,
            media_type,
            content,
        } => {
            let text = std::str::from_utf8(content)
                .map_err(|e| Error::import_parse(format!("{} is not UTF-8 text: {}", name, e)))?;
            if text.trim().is_empty() {
                return Err(Error::EmptyImport);
            }
            if media_type.eq_ignore_ascii_case(MEDIA_JSON) {
                serde_json::from_str(text).map_err(|e| Error::import_parse(e.to_string()))?
            } else {
                parse_yaml(text)?
            }
        }
    };

    let records = into_records(value)?;
    debug!(source = %source.describe(), records = records.len(), "Import normalized");
    Ok(records)
}

fn parse_text(text: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(json_err) => {
            debug!(error = %json_err, "Not JSON, trying YAML");
            parse_yaml(text)
        }
    }
}

fn parse_yaml(text: &str) -> Result<Value> {
    serde_yaml::from_str::<Value>(text).map_err(|e| Error::import_parse(e.to_string()))
}

fn into_records(value: Value) -> Result<Vec<Map<String, Value>>> {
    match value {
        Value::Null => Err(Error::EmptyImport),
        Value::Object(map) if map.is_empty() => Err(Error::EmptyImport),
        Value::Object(map) => Ok(vec![map]),
        Value::Array(items) if items.is_empty() => Err(Error::EmptyImport),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok(map),
                other => Err(Error::import_shape(format!(
                    "element {} is {}",
                    index + 1,
                    kind_of(&other)
                ))),
            })
            .collect(),
        other => Err(Error::import_shape(format!("found {}", kind_of(&other)))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
