// pbir-filters - core/models.rs
//
// Semantic model summary: which report folders are bound to which model.

use crate::core::model::ModelBinding;
use crate::util::constants::REPORT_FOLDER_SUFFIX;

/// Display name for a report folder: its name with `.Report` removed.
pub fn report_display_name(folder_name: &str) -> String {
    folder_name.replace(REPORT_FOLDER_SUFFIX, "")
}

/// Report names grouped by model path, paths in first-seen order.
pub fn group_bindings(bindings: &[ModelBinding]) -> Vec<(String, Vec<String>)> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for binding in bindings {
        match grouped
            .iter_mut()
            .find(|(path, _)| *path == binding.reference_path)
        {
            Some((_, names)) => names.push(binding.name.clone()),
            None => grouped.push((binding.reference_path.clone(), vec![binding.name.clone()])),
        }
    }
    grouped
}

/// Each model path, its report names indented beneath it, then a blank line.
pub fn format_model_summary(bindings: &[ModelBinding]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for (path, names) in group_bindings(bindings) {
        lines.push(path);
        lines.extend(names.into_iter().map(|name| format!("    {name}")));
        lines.push(String::new());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn binding(path: &str, name: &str) -> ModelBinding {
        ModelBinding {
            reference_path: path.to_string(),
            name: name.to_string(),
            folder: PathBuf::from(format!("{name}.Report")),
        }
    }

    #[test]
    fn test_display_name_strips_suffix() {
        assert_eq!(report_display_name("Sales Overview.Report"), "Sales Overview");
        assert_eq!(report_display_name("Scratch"), "Scratch");
    }

    #[test]
    fn test_grouped_by_path_in_first_seen_order() {
        let bindings = vec![
            binding("../Sales.Dataset", "North"),
            binding("../Finance.Dataset", "Ledger"),
            binding("../Sales.Dataset", "South"),
        ];
        assert_eq!(
            format_model_summary(&bindings),
            "../Sales.Dataset\n    North\n    South\n\n../Finance.Dataset\n    Ledger\n"
        );
    }
}
