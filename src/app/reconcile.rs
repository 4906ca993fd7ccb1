// pbir-filters - app/reconcile.rs
//
// Batch filter operations over a discovered list of report files.
//
// Every operation handles files one at a time and independently. A file that
// cannot be read, parsed or decoded is logged and skipped; it is never
// treated as "no filters" and never written back, so a damaged report cannot
// be silently emptied.

use crate::core::filters::{self, CountKind};
use crate::core::model::FilterEntry;
use crate::platform::fs;
use crate::util::error::DocumentError;
use std::io::Write;
use std::path::{Path, PathBuf};

/// How many files a batch operation handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files read (and, for mutating operations, rewritten).
    pub processed: usize,
    /// Files skipped because of an error.
    pub skipped: usize,
    /// Entries added or removed across all processed files.
    pub changed: usize,
}

/// Load the canonical new-filter set (a JSON array).
pub fn load_filter_source(path: &Path) -> Result<Vec<FilterEntry>, DocumentError> {
    let entries: Vec<FilterEntry> = fs::read_json_array(path)?
        .into_iter()
        .map(FilterEntry::from)
        .collect();
    tracing::debug!(path = %path.display(), count = entries.len(), "Filter source loaded");
    Ok(entries)
}

/// Replace every report's filter list with `new_filters`.
pub fn update_all(files: &[PathBuf], new_filters: &[FilterEntry]) -> BatchSummary {
    run_batch(files, "update", |path| {
        let mut report = fs::read_report(path)?;
        report.set_filters(new_filters)?;
        fs::write_report(&report)?;
        Ok(new_filters.len())
    })
}

/// Append each of `new_filters` to every report unless already present.
pub fn append_all(files: &[PathBuf], new_filters: &[FilterEntry]) -> BatchSummary {
    edit_all(files, "append", |entries| {
        filters::append_unique(entries, new_filters)
    })
}

/// Remove inactive entries from every report.
pub fn delete_inactive_all(files: &[PathBuf]) -> BatchSummary {
    edit_all(files, "delete-inactive", filters::retain_active)
}

/// Write one `<report folder>: <count>` line per readable report.
pub fn count_all<W: Write>(
    files: &[PathBuf],
    kind: CountKind,
    out: &mut W,
) -> std::io::Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    for path in files {
        let counts = match fs::read_report(path).and_then(|r| r.filters()) {
            Ok(entries) => filters::count(&entries),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping report");
                summary.skipped += 1;
                continue;
            }
        };
        let folder = path.parent().unwrap_or(path);
        writeln!(out, "{}: {}", folder.display(), kind.select(counts))?;
        summary.processed += 1;
    }
    Ok(summary)
}

/// Read, edit and rewrite the decoded filter list of every report.
fn edit_all<F>(files: &[PathBuf], operation: &'static str, mut edit: F) -> BatchSummary
where
    F: FnMut(&mut Vec<FilterEntry>) -> usize,
{
    run_batch(files, operation, |path| {
        let mut report = fs::read_report(path)?;
        let mut entries = report.filters()?;
        let changed = edit(&mut entries);
        report.set_filters(&entries)?;
        fs::write_report(&report)?;
        Ok(changed)
    })
}

fn run_batch<F>(files: &[PathBuf], operation: &'static str, mut apply: F) -> BatchSummary
where
    F: FnMut(&Path) -> Result<usize, DocumentError>,
{
    let mut summary = BatchSummary::default();
    for path in files {
        match apply(path) {
            Ok(changed) => {
                tracing::debug!(path = %path.display(), operation, changed, "Report rewritten");
                summary.processed += 1;
                summary.changed += changed;
            }
            Err(e) => {
                tracing::warn!(operation, error = %e, "Skipping report");
                summary.skipped += 1;
            }
        }
    }
    tracing::info!(
        operation,
        processed = summary.processed,
        skipped = summary.skipped,
        changed = summary.changed,
        "Batch complete"
    );
    summary
}
