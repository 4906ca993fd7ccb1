// pbir-filters - tests/e2e_pipeline.rs
//
// End-to-end tests for the reconcile operations and the default pipeline,
// run against real report folders on disk.

use pbir_filters::app::pipeline;
use pbir_filters::app::reconcile::{append_all, count_all, delete_inactive_all, update_all};
use pbir_filters::core::filters::{decode_filters, CountKind};
use pbir_filters::platform::config::AppConfig;
use pbir_filters::platform::fs::read_report;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

const SALES: &str = "../Sales.Dataset";

/// Workspace layout: `<tmp>/tools` is the working directory holding
/// filters.json; report folders sit beside it under `<tmp>`.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("tools")).unwrap();
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn tools(&self) -> PathBuf {
        self.dir.path().join("tools")
    }

    fn report(&self, folder: &str, model: &str, filters: &str) -> PathBuf {
        let dir = self.root().join(folder);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("definition.pbir"),
            format!(r#"{{"datasetReference": {{"byPath": {{"path": "{model}"}}}}}}"#),
        )
        .unwrap();
        let doc = serde_json::json!({
            "config": "{\"version\":\"5.43\"}",
            "filters": filters,
            "layoutOptimization": 0
        });
        let path = dir.join("report.json");
        fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();
        path
    }

    fn filters_json(&self, body: &str) {
        fs::write(self.tools().join("filters.json"), body).unwrap();
    }

    fn config(&self) -> AppConfig {
        let mut config = AppConfig::defaults_for(&self.tools());
        config.reference_path = Some(SALES.to_string());
        config
    }
}

fn encoded_filters(path: &Path) -> String {
    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    doc["filters"].as_str().unwrap().to_string()
}

const NEW_FILTERS: &str = r#"[
    {"name": "Region", "expression": {"Column": {"Expression": {"SourceRef": {"Entity": "Geo"}}, "Property": "Region"}}, "filter": {"Version": 2}, "displayName": "Region"},
    {"name": "Year", "expression": {"HierarchyLevel": {"Expression": {"Hierarchy": {"Expression": {"SourceRef": {"Entity": "Calendar"}}}}, "Level": "Year"}}, "displayName": "Year"}
]"#;

// =============================================================================
// Reconcile E2E
// =============================================================================

/// Append never loses existing entries and never adds an exact duplicate.
#[test]
fn e2e_append_is_superset_without_duplicates() {
    let ws = Workspace::new();
    let report = ws.report(
        "A.Report",
        SALES,
        r#"[{"name":"Keep"},{"name":"Region","filter":{}}]"#,
    );
    let new = decode_filters(r#"[{"name": "Keep"}, {"name": "Fresh"}]"#).unwrap();

    let original = read_report(&report).unwrap().filters().unwrap();
    append_all(&[report.clone()], &new);
    append_all(&[report.clone()], &new);
    let merged = read_report(&report).unwrap().filters().unwrap();

    for entry in original.iter().chain(new.iter()) {
        assert!(merged.contains(entry), "missing {entry:?}");
    }
    assert_eq!(merged.len(), 3);
    assert!(merged.len() <= original.len() + new.len());
}

/// Running delete-inactive twice leaves byte-identical content.
#[test]
fn e2e_delete_inactive_is_idempotent() {
    let ws = Workspace::new();
    let report = ws.report(
        "A.Report",
        SALES,
        r#"[{"name":"a","filter":{"Where":[]}},{"name":"b"},{"name":"c","filter":{}}]"#,
    );
    delete_inactive_all(&[report.clone()]);
    let once = fs::read_to_string(&report).unwrap();
    delete_inactive_all(&[report.clone()]);
    let twice = fs::read_to_string(&report).unwrap();
    assert_eq!(once, twice);
    assert_eq!(
        encoded_filters(&report),
        r#"[{"name": "a", "filter": {"Where": []}}, {"name": "c", "filter": {}}]"#
    );
}

/// Other document fields survive a rewrite in their original order, and the
/// rewrite uses 4-space indentation.
#[test]
fn e2e_rewrite_preserves_document_shape() {
    let ws = Workspace::new();
    let report = ws.report("A.Report", SALES, "[]");
    update_all(&[report.clone()], &decode_filters(r#"[{"name":"x"}]"#).unwrap());
    assert_eq!(
        fs::read_to_string(&report).unwrap(),
        "{\n    \"config\": \"{\\\"version\\\":\\\"5.43\\\"}\",\n    \
         \"filters\": \"[{\\\"name\\\": \\\"x\\\"}]\",\n    \
         \"layoutOptimization\": 0\n}"
    );
}

/// Count = active + inactive for every report.
#[test]
fn e2e_counts_add_up() {
    let ws = Workspace::new();
    let files = vec![
        ws.report("A.Report", SALES, r#"[{"name":"a","filter":{}},{"name":"b"}]"#),
        ws.report("B.Report", SALES, r#"[{"name":"c"},{"name":"d"},{"name":"e"}]"#),
        ws.report("C.Report", SALES, "[]"),
    ];

    let parse = |kind| {
        let mut out = Vec::new();
        count_all(&files, kind, &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| l.rsplit(": ").next().unwrap().parse::<usize>().unwrap())
            .collect::<Vec<_>>()
    };
    let all = parse(CountKind::All);
    let active = parse(CountKind::Active);
    let inactive = parse(CountKind::Inactive);
    assert_eq!(all, [2, 3, 0]);
    for i in 0..all.len() {
        assert_eq!(all[i], active[i] + inactive[i]);
    }
}

// =============================================================================
// Pipeline E2E
// =============================================================================

#[test]
fn e2e_pipeline_reconciles_and_reports() {
    let ws = Workspace::new();
    ws.filters_json(NEW_FILTERS);
    let bound = ws.report(
        "North.Report",
        SALES,
        r#"[{"name":"Old"},{"name":"Region","filter":{"Version":1}}]"#,
    );
    let other_body = r#"[{"name":"Untouched"}]"#;
    let other = ws.report("Ledger.Report", "../Finance.Dataset", other_body);
    let other_before = fs::read_to_string(&other).unwrap();

    let mut out = Vec::new();
    let summary = pipeline::run(&ws.config(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(summary.reports, vec![bound.clone()]);
    assert_eq!(summary.deleted.changed, 1);
    assert_eq!(summary.appended.changed, 2);
    assert!(summary.aggregated);

    let filters = read_report(&bound).unwrap().filters().unwrap();
    assert_eq!(filters.len(), 3);
    assert_eq!(filters[0].as_value()["name"], "Region");
    assert!(filters.iter().all(|f| f.as_value()["name"] != "Old"));

    assert_eq!(fs::read_to_string(&other).unwrap(), other_before);

    let folder = bound.parent().unwrap().display().to_string();
    let expected_head = format!(
        "All:\n{folder}: 2\n\nActive:\n{folder}: 1\n\nInactive:\n{folder}: 1\n\n\
         All:\n{folder}: 3\n\nActive:\n{folder}: 2\n\nInactive:\n{folder}: 1\n"
    );
    assert!(text.starts_with(&expected_head), "got:\n{text}");
    assert!(text.contains(&format!("Geo\n    {:<60}: Region\n", "Region")));
    assert!(text.contains(&format!("Calendar\n    {:<60}: Year\n", "Year")));
}

/// A missing filters.json aborts the run before any report is modified.
#[test]
fn e2e_pipeline_without_filter_source_modifies_nothing() {
    let ws = Workspace::new();
    let report = ws.report("North.Report", SALES, r#"[{"name":"Old"}]"#);
    let before = fs::read_to_string(&report).unwrap();

    let mut out = Vec::new();
    assert!(pipeline::run(&ws.config(), &mut out).is_err());
    assert!(out.is_empty());
    assert_eq!(fs::read_to_string(&report).unwrap(), before);
}

#[test]
fn e2e_pipeline_saves_aggregate_when_configured() {
    let ws = Workspace::new();
    ws.filters_json(NEW_FILTERS);
    ws.report("North.Report", SALES, "[]");

    let mut config = ws.config();
    config.save_aggregate = true;
    config.key_width = 8;

    let mut out = Vec::new();
    pipeline::run(&config, &mut out).unwrap();

    let saved = fs::read_to_string(ws.tools().join("aggregated_filters.txt")).unwrap();
    assert_eq!(saved, "Geo\n    Region  : Region\n\nCalendar\n    Year    : Year\n");
    assert!(String::from_utf8(out)
        .unwrap()
        .ends_with("Formatted aggregated data saved to aggregated_filters.txt\n"));
}
