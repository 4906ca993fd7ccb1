// pbir-filters - core/discovery.rs
//
// Recursive directory traversal locating report folders.
//
// A report folder is any directory holding `definition.pbir`. Filtered
// discovery additionally requires `report.json` and a definition whose
// `datasetReference.byPath.path` equals the configured reference path.
//
// Error policy (shared by both passes):
//   - An invalid root is fatal and returned as `Err`.
//   - An unreadable or unparseable definition is non-fatal: it is logged,
//     recorded in `skipped`, and the walk continues with the next directory.
//   - Excluded directory names short-circuit descent via `filter_entry`.

use crate::core::model::{DefinitionRecord, ModelBinding};
use crate::core::models::report_display_name;
use crate::util::constants;
use crate::util::error::{DiscoveryError, DocumentError};
use std::path::{Path, PathBuf};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a discovery walk.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    /// Exact `datasetReference.byPath.path` a report must be bound to.
    /// Required by [`discover_reports`]; ignored by [`list_models`].
    pub reference_path: Option<String>,

    /// Maximum directory recursion depth. `None` walks the whole tree.
    pub max_depth: Option<usize>,

    /// Glob patterns matched against directory names. Matching directories
    /// are not descended into. Empty by default.
    pub exclude_patterns: Vec<String>,
}

/// Outcome of a filtered discovery walk.
#[derive(Debug, Default)]
pub struct Discovery {
    /// `report.json` paths bound to the configured model, in walk order.
    pub reports: Vec<PathBuf>,
    /// Definitions that could not be read; their folders were skipped.
    pub skipped: Vec<DocumentError>,
}

/// Outcome of an unfiltered model listing walk.
#[derive(Debug, Default)]
pub struct ModelListing {
    pub bindings: Vec<ModelBinding>,
    pub skipped: Vec<DocumentError>,
}

// =============================================================================
// Discovery
// =============================================================================

/// Find every `report.json` whose sibling definition is bound to
/// `config.reference_path`.
pub fn discover_reports(root: &Path, config: &DiscoveryConfig) -> Result<Discovery, DiscoveryError> {
    let expected = config
        .reference_path
        .as_deref()
        .ok_or(DiscoveryError::MissingReferencePath)?;

    let mut discovery = Discovery::default();
    for dir in report_folders(root, config)? {
        let report_path = dir.join(constants::REPORT_FILE_NAME);
        if !report_path.is_file() {
            tracing::trace!(dir = %dir.display(), "No report.json beside definition");
            continue;
        }

        let definition_path = dir.join(constants::DEFINITION_FILE_NAME);
        let definition = match load_definition(&definition_path) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping report folder");
                discovery.skipped.push(e);
                continue;
            }
        };

        match definition.reference_path() {
            Some(path) if path == expected => {
                tracing::debug!(report = %report_path.display(), "Report matched");
                discovery.reports.push(report_path);
            }
            other => {
                tracing::trace!(
                    dir = %dir.display(),
                    reference_path = ?other,
                    "Bound to a different model"
                );
            }
        }
    }

    tracing::info!(
        root = %root.display(),
        reports = discovery.reports.len(),
        skipped = discovery.skipped.len(),
        "Discovery complete"
    );
    Ok(discovery)
}

/// List every report folder with the model path its definition points at.
pub fn list_models(root: &Path, config: &DiscoveryConfig) -> Result<ModelListing, DiscoveryError> {
    let mut listing = ModelListing::default();
    for dir in report_folders(root, config)? {
        let definition_path = dir.join(constants::DEFINITION_FILE_NAME);
        let definition = match load_definition(&definition_path) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping report folder");
                listing.skipped.push(e);
                continue;
            }
        };

        let folder_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        listing.bindings.push(ModelBinding {
            reference_path: definition
                .reference_path()
                .unwrap_or(constants::MISSING_REFERENCE_PATH)
                .to_string(),
            name: report_display_name(&folder_name),
            folder: dir,
        });
    }

    tracing::info!(
        root = %root.display(),
        reports = listing.bindings.len(),
        skipped = listing.skipped.len(),
        "Model listing complete"
    );
    Ok(listing)
}

/// Parse a definition marker file.
pub fn load_definition(path: &Path) -> Result<DefinitionRecord, DocumentError> {
    let text = std::fs::read_to_string(path).map_err(|e| DocumentError::Io {
        path: path.to_path_buf(),
        operation: "read",
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| DocumentError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

// =============================================================================
// Walk
// =============================================================================

/// Directories under `root` (root included) that contain a definition file.
fn report_folders(root: &Path, config: &DiscoveryConfig) -> Result<Vec<PathBuf>, DiscoveryError> {
    check_root(root)?;

    let exclude_pats = compile_patterns(&config.exclude_patterns);

    tracing::debug!(
        root = %root.display(),
        max_depth = ?config.max_depth,
        exclude = ?config.exclude_patterns,
        "Discovery starting"
    );

    let mut walk = walkdir::WalkDir::new(root);
    if let Some(depth) = config.max_depth {
        walk = walk.max_depth(depth);
    }
    let walker = walk
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_str().unwrap_or("");
            let excluded = exclude_pats.iter().any(|p| p.matches(name));
            if excluded {
                tracing::debug!(dir = %e.path().display(), "Excluded directory not descended into");
            }
            !excluded
        });

    let mut folders = Vec::new();
    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                // Inaccessible entry: non-fatal, the rest of the tree is still walked.
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                tracing::warn!(path = %path_str, error = %e, "Cannot access directory entry");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.path().join(constants::DEFINITION_FILE_NAME).is_file() {
            folders.push(entry.into_path());
        }
    }
    Ok(folders)
}

/// Fail fast on a root that cannot be walked.
///
/// Uses `fs::metadata()` rather than `Path::is_dir()` so that permission
/// problems are reported as such instead of as a missing path.
fn check_root(root: &Path) -> Result<(), DiscoveryError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => Err(DiscoveryError::RootNotFound {
            path: root.to_path_buf(),
        }),
    }
}

/// Compile glob patterns once; log and skip any that fail compilation.
fn compile_patterns(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, error = %e, "Invalid exclude pattern, skipping");
                None
            }
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
