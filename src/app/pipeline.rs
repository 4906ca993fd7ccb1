// pbir-filters - app/pipeline.rs
//
// The default end-to-end run:
//   1. discover reports bound to the configured model
//   2. print all/active/inactive counts
//   3. delete inactive filters, then append the canonical filter set
//   4. print the counts again
//   5. print (and optionally save) the filter definition aggregation
//
// The filter source is loaded before anything is modified so a missing or
// broken filters.json aborts the run with every report untouched.

use crate::app::reconcile::{self, BatchSummary};
use crate::app::summary;
use crate::core::discovery::discover_reports;
use crate::core::filters::CountKind;
use crate::platform::config::AppConfig;
use crate::util::error::Result;
use std::io::Write;
use std::path::PathBuf;

/// What a pipeline run did.
#[derive(Debug, Default)]
pub struct PipelineSummary {
    pub reports: Vec<PathBuf>,
    pub deleted: BatchSummary,
    pub appended: BatchSummary,
    /// False when the aggregation input could not be read.
    pub aggregated: bool,
}

/// Print the three count blocks, separated by blank lines.
pub fn write_count_report<W: Write>(
    files: &[PathBuf],
    out: &mut W,
    trailing_blank: bool,
) -> std::io::Result<()> {
    let kinds = [CountKind::All, CountKind::Active, CountKind::Inactive];
    for (i, kind) in kinds.into_iter().enumerate() {
        writeln!(out, "{}:", kind.label())?;
        reconcile::count_all(files, kind, out)?;
        if trailing_blank || i + 1 < kinds.len() {
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Run the full pipeline, writing reports to `out`.
pub fn run<W: Write>(config: &AppConfig, out: &mut W) -> Result<PipelineSummary> {
    let discovery = discover_reports(&config.root, &config.discovery())?;
    let new_filters = reconcile::load_filter_source(&config.filters_source)?;

    let files = discovery.reports;
    write_count_report(&files, out, true)?;

    let deleted = reconcile::delete_inactive_all(&files);
    let appended = reconcile::append_all(&files, &new_filters);

    write_count_report(&files, out, false)?;

    let aggregated = match summary::aggregate_file(&config.aggregate_input, config.key_width) {
        Ok(text) => {
            writeln!(out, "{text}")?;
            if config.save_aggregate {
                match summary::save_aggregate(&config.aggregate_output, &text) {
                    Ok(()) => {
                        writeln!(out, "{}", summary::saved_notice(&config.aggregate_output))?
                    }
                    Err(e) => tracing::error!(error = %e, "Could not save aggregation report"),
                }
            }
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Could not aggregate filter definitions");
            false
        }
    };

    Ok(PipelineSummary {
        reports: files,
        deleted,
        appended,
        aggregated,
    })
}
