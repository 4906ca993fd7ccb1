// pbir-filters - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// The report folder files are only partially typed: the parts this tool
// inspects get serde structs, everything else stays `serde_json::Value` so it
// is carried through a rewrite untouched.

use crate::util::constants::ACTIVE_FILTER_KEY;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

// =============================================================================
// Definition marker (definition.pbir)
// =============================================================================

/// The parts of `definition.pbir` that bind a report to a semantic model.
///
/// Every level is optional so a definition without a by-path reference
/// (e.g. one bound by connection string) still parses.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DefinitionRecord {
    pub dataset_reference: Option<DatasetReference>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatasetReference {
    pub by_path: Option<ByPathReference>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ByPathReference {
    pub path: Option<String>,
}

impl DefinitionRecord {
    /// `datasetReference.byPath.path`, if present.
    pub fn reference_path(&self) -> Option<&str> {
        self.dataset_reference
            .as_ref()?
            .by_path
            .as_ref()?
            .path
            .as_deref()
    }
}

// =============================================================================
// Filter entries (report.json)
// =============================================================================

/// One element of a report's decoded filter list.
///
/// Opaque apart from the `filter` key: its presence makes the entry active,
/// its absence makes it an inactive placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterEntry(pub Value);

impl FilterEntry {
    /// True when the entry carries a concrete filter expression.
    pub fn is_active(&self) -> bool {
        self.0
            .as_object()
            .is_some_and(|obj| obj.contains_key(ACTIVE_FILTER_KEY))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for FilterEntry {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

// =============================================================================
// Filter definitions (aggregation input)
// =============================================================================

/// A filter definition as listed in `filters.json`, read for aggregation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterDefinition {
    pub expression: Map<String, Value>,

    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

/// The model field a filter definition targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    /// Table the field belongs to.
    pub entity: String,
    /// Column property or hierarchy level name.
    pub key: String,
}

#[derive(Deserialize)]
struct SourceRef {
    #[serde(rename = "Entity")]
    entity: String,
}

#[derive(Deserialize)]
struct SourceRefExpression {
    #[serde(rename = "SourceRef")]
    source_ref: SourceRef,
}

#[derive(Deserialize)]
struct ColumnExpression {
    #[serde(rename = "Expression")]
    expression: SourceRefExpression,
    #[serde(rename = "Property")]
    property: String,
}

#[derive(Deserialize)]
struct HierarchyExpression {
    #[serde(rename = "Expression")]
    expression: SourceRefExpression,
}

#[derive(Deserialize)]
struct HierarchyRef {
    #[serde(rename = "Hierarchy")]
    hierarchy: HierarchyExpression,
}

#[derive(Deserialize)]
struct HierarchyLevelExpression {
    #[serde(rename = "Expression")]
    expression: HierarchyRef,
    #[serde(rename = "Level")]
    level: String,
}

impl FilterDefinition {
    /// Resolve the field this definition filters on.
    ///
    /// `Column` takes precedence over `HierarchyLevel`. Returns `None` for any
    /// other expression kind (measures, aggregations) or a malformed variant.
    pub fn field(&self) -> Option<FieldRef> {
        if let Some(column) = self.expression.get("Column") {
            let column = ColumnExpression::deserialize(column).ok()?;
            return Some(FieldRef {
                entity: column.expression.source_ref.entity,
                key: column.property,
            });
        }
        if let Some(level) = self.expression.get("HierarchyLevel") {
            let level = HierarchyLevelExpression::deserialize(level).ok()?;
            return Some(FieldRef {
                entity: level.expression.hierarchy.expression.source_ref.entity,
                key: level.level,
            });
        }
        None
    }
}

// =============================================================================
// Model lister
// =============================================================================

/// A report folder and the semantic model path its definition points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBinding {
    /// `datasetReference.byPath.path`, or a placeholder when absent.
    pub reference_path: String,
    /// Folder name with the `.Report` suffix removed.
    pub name: String,
    /// Folder the definition was found in.
    pub folder: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_path_extracted() {
        let def: DefinitionRecord = serde_json::from_value(json!({
            "version": "1.0",
            "datasetReference": { "byPath": { "path": "../Sales.Dataset" } }
        }))
        .unwrap();
        assert_eq!(def.reference_path(), Some("../Sales.Dataset"));
    }

    #[test]
    fn test_reference_path_missing_levels() {
        let def: DefinitionRecord =
            serde_json::from_value(json!({ "datasetReference": { "byConnection": {} } }))
                .unwrap();
        assert_eq!(def.reference_path(), None);
        let empty: DefinitionRecord = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.reference_path(), None);
    }

    #[test]
    fn test_active_requires_filter_key() {
        assert!(FilterEntry(json!({ "name": "a", "filter": {} })).is_active());
        assert!(!FilterEntry(json!({ "name": "a" })).is_active());
        assert!(!FilterEntry(json!("filter")).is_active());
    }

    #[test]
    fn test_column_field() {
        let def: FilterDefinition = serde_json::from_value(json!({
            "displayName": "Region",
            "expression": { "Column": {
                "Expression": { "SourceRef": { "Entity": "Geography" } },
                "Property": "RegionName"
            }}
        }))
        .unwrap();
        assert_eq!(
            def.field(),
            Some(FieldRef {
                entity: "Geography".to_string(),
                key: "RegionName".to_string()
            })
        );
    }

    #[test]
    fn test_hierarchy_level_field() {
        let def: FilterDefinition = serde_json::from_value(json!({
            "displayName": "Year",
            "expression": { "HierarchyLevel": {
                "Expression": { "Hierarchy": {
                    "Expression": { "SourceRef": { "Entity": "Calendar" } },
                    "Hierarchy": "Date Hierarchy"
                }},
                "Level": "Year"
            }}
        }))
        .unwrap();
        let field = def.field().unwrap();
        assert_eq!(field.entity, "Calendar");
        assert_eq!(field.key, "Year");
    }

    #[test]
    fn test_other_expression_has_no_field() {
        let def: FilterDefinition = serde_json::from_value(json!({
            "displayName": "Total",
            "expression": { "Measure": { "Property": "Total Sales" } }
        }))
        .unwrap();
        assert_eq!(def.field(), None);
    }
}
