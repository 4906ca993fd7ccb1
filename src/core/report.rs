// pbir-filters - core/report.rs
//
// In-memory view of one report.json: the whole document, kept as an ordered
// JSON object, with typed access to the string-encoded `filters` field.
// Core layer: no I/O; platform::fs reads and writes the bytes.

use crate::core::filters::{decode_filters, encode_filters, DecodeFailure};
use crate::core::model::FilterEntry;
use crate::util::constants::{FILTERS_FIELD, JSON_INDENT};
use crate::util::error::DocumentError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// A parsed report document.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    path: PathBuf,
    root: Map<String, Value>,
}

impl ReportDocument {
    /// Parse document text read from `path`.
    pub fn parse(path: &Path, text: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(text).map_err(|e| DocumentError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        match value {
            Value::Object(root) => Ok(Self {
                path: path.to_path_buf(),
                root,
            }),
            _ => Err(DocumentError::NotAnObject {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the `filters` field.
    ///
    /// A document without the field has no filters. A field that is present
    /// but not a string holding a JSON array is an error, so a damaged
    /// document is never mistaken for an empty one.
    pub fn filters(&self) -> Result<Vec<FilterEntry>, DocumentError> {
        let raw = match self.root.get(FILTERS_FIELD) {
            None => return Ok(Vec::new()),
            Some(Value::String(s)) => s,
            Some(_) => {
                return Err(DocumentError::FiltersNotString {
                    path: self.path.clone(),
                })
            }
        };
        decode_filters(raw).map_err(|failure| match failure {
            DecodeFailure::Malformed(source) => DocumentError::FiltersMalformed {
                path: self.path.clone(),
                source,
            },
            DecodeFailure::NotArray => DocumentError::FiltersNotArray {
                path: self.path.clone(),
            },
        })
    }

    /// Replace the `filters` field with the encoded `entries`.
    ///
    /// The field keeps its position in the document when it already exists.
    pub fn set_filters(&mut self, entries: &[FilterEntry]) -> Result<(), DocumentError> {
        let encoded = encode_filters(entries).map_err(|e| DocumentError::Json {
            path: self.path.clone(),
            source: e,
        })?;
        self.root
            .insert(FILTERS_FIELD.to_string(), Value::String(encoded));
        Ok(())
    }

    /// Serialise the whole document with 4-space indentation.
    pub fn to_pretty_json(&self) -> Result<String, DocumentError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.root
            .serialize(&mut ser)
            .map_err(|e| DocumentError::Json {
                path: self.path.clone(),
                source: e,
            })?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> ReportDocument {
        ReportDocument::parse(Path::new("A.Report/report.json"), text).unwrap()
    }

    #[test]
    fn test_missing_filters_field_is_empty() {
        assert!(doc(r#"{"config": "{}"}"#).filters().unwrap().is_empty());
    }

    #[test]
    fn test_non_string_filters_field_is_error() {
        let err = doc(r#"{"filters": [1, 2]}"#).filters().unwrap_err();
        assert!(matches!(err, DocumentError::FiltersNotString { .. }));
    }

    #[test]
    fn test_garbled_filters_field_is_error() {
        let err = doc(r#"{"filters": "[{\"name\""}"#).filters().unwrap_err();
        assert!(matches!(err, DocumentError::FiltersMalformed { .. }));
        let err = doc(r#"{"filters": "42"}"#).filters().unwrap_err();
        assert!(matches!(err, DocumentError::FiltersNotArray { .. }));
    }

    #[test]
    fn test_top_level_must_be_object() {
        let err = ReportDocument::parse(Path::new("r.json"), "[]").unwrap_err();
        assert!(matches!(err, DocumentError::NotAnObject { .. }));
    }

    #[test]
    fn test_rewrite_keeps_other_fields_and_order() {
        let mut report = doc(r#"{"id": 7, "filters": "[]", "config": "{\"x\":1}"}"#);
        let entries = vec![FilterEntry(serde_json::json!({ "name": "b" }))];
        report.set_filters(&entries).unwrap();
        assert_eq!(
            report.to_pretty_json().unwrap(),
            "{\n    \"id\": 7,\n    \"filters\": \"[{\\\"name\\\": \\\"b\\\"}]\",\n    \"config\": \"{\\\"x\\\":1}\"\n}"
        );
    }
}
