// pbir-filters - app/summary.rs
//
// Read-only reports: the filter definition aggregation and the semantic
// model listing.

use crate::core::aggregate::{aggregate, format_aggregate};
use crate::core::discovery::{list_models, DiscoveryConfig};
use crate::core::model::FilterDefinition;
use crate::core::models::format_model_summary;
use crate::platform::fs;
use crate::util::error::{DiscoveryError, DocumentError};
use std::path::Path;

/// Load filter definitions from a JSON array file.
///
/// Elements that are not definition objects are skipped, matching how the
/// aggregation skips definitions it cannot place.
pub fn load_definitions(path: &Path) -> Result<Vec<FilterDefinition>, DocumentError> {
    let items = fs::read_json_array(path)?;
    let total = items.len();
    let definitions: Vec<FilterDefinition> = items
        .into_iter()
        .enumerate()
        .filter_map(|(position, item)| match serde_json::from_value::<FilterDefinition>(item) {
            Ok(def) => Some(def),
            Err(e) => {
                tracing::debug!(position, error = %e, "Skipped: not a filter definition");
                None
            }
        })
        .collect();
    tracing::debug!(
        path = %path.display(),
        total,
        loaded = definitions.len(),
        "Filter definitions loaded"
    );
    Ok(definitions)
}

/// Build the aggregation report text for the definitions in `input`.
pub fn aggregate_file(input: &Path, key_width: usize) -> Result<String, DocumentError> {
    let definitions = load_definitions(input)?;
    let groups = aggregate(&definitions);
    tracing::info!(
        definitions = definitions.len(),
        entities = groups.len(),
        "Filter definitions aggregated"
    );
    Ok(format_aggregate(&groups, key_width))
}

/// Persist an aggregation report as UTF-8 text.
pub fn save_aggregate(output: &Path, text: &str) -> Result<(), DocumentError> {
    fs::write_atomic(output, text.as_bytes())?;
    tracing::info!(path = %output.display(), "Aggregation report saved");
    Ok(())
}

/// Confirmation line printed after saving; names the file, while the full
/// path goes to the log.
pub fn saved_notice(output: &Path) -> String {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| output.display().to_string());
    format!("Formatted aggregated data saved to {name}")
}

/// Model path → report names summary for every report folder under `root`.
pub fn model_summary(root: &Path, config: &DiscoveryConfig) -> Result<String, DiscoveryError> {
    let listing = list_models(root, config)?;
    Ok(format_model_summary(&listing.bindings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DEFINITIONS: &str = r#"[
        {"displayName": "Region", "expression": {"Column": {
            "Expression": {"SourceRef": {"Entity": "Geo"}}, "Property": "Region"}}},
        {"displayName": "Total", "expression": {"Measure": {"Property": "Total"}}},
        "not an object",
        {"displayName": "Area", "expression": {"Column": {
            "Expression": {"SourceRef": {"Entity": "Geo"}}, "Property": "Region"}}}
    ]"#;

    #[test]
    fn test_aggregate_file_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("filters.json");
        std::fs::write(&input, DEFINITIONS).unwrap();
        let text = aggregate_file(&input, 8).unwrap();
        assert_eq!(text, "Geo\n    Region  : Area\n");
    }

    #[test]
    fn test_save_aggregate_writes_text() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("aggregated_filters.txt");
        save_aggregate(&output, "Geo\n    Region: Area\n").unwrap();
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "Geo\n    Region: Area\n"
        );
    }

    #[test]
    fn test_saved_notice_names_file() {
        assert_eq!(
            saved_notice(Path::new("/work/tools/aggregated_filters.txt")),
            "Formatted aggregated data saved to aggregated_filters.txt"
        );
    }

    #[test]
    fn test_save_aggregate_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("missing").join("out.txt");
        assert!(save_aggregate(&output, "x").is_err());
    }
}
