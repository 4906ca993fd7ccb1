// pbir-filters - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading (config.toml + CLI overrides)
// 3. Logging initialisation
// 4. Dispatch to the selected command

use clap::{Parser, Subcommand};
use pbir_filters::app::{pipeline, reconcile, summary};
use pbir_filters::core::discovery::discover_reports;
use pbir_filters::core::filters::CountKind;
use pbir_filters::platform::config::{load_config, AppConfig};
use pbir_filters::util::{self, error::Result};
use std::io::Write;
use std::path::PathBuf;

/// pbir-filters - batch filter maintenance for Power BI PBIR report folders.
///
/// Finds every report bound to one semantic model and reconciles the filter
/// list embedded in its report.json.
#[derive(Parser, Debug)]
#[command(name = "pbir-filters", version, about)]
struct Cli {
    /// Config file (default: ./config.toml, then the platform config dir).
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Directory to scan for report folders (default: parent of the working dir).
    #[arg(short = 'r', long = "root", global = true)]
    root: Option<PathBuf>,

    /// Semantic model path reports must be bound to, e.g. "../Sales.Dataset".
    #[arg(short = 'm', long = "reference-path", global = true)]
    reference_path: Option<String>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count, prune inactive, append new filters, count again, aggregate.
    Run,

    /// Print the number of filters in each report.
    Count {
        /// Count only active filters.
        #[arg(long, conflicts_with = "inactive")]
        active: bool,
        /// Count only inactive filters.
        #[arg(long)]
        inactive: bool,
    },

    /// Remove inactive filters from each report.
    Prune,

    /// Append filters from the source file, skipping exact duplicates.
    Append {
        /// JSON array of filters (default: ./filters.json).
        #[arg(short = 'f', long = "filters")]
        filters: Option<PathBuf>,
    },

    /// Replace each report's filters with the source file's list.
    Update {
        /// JSON array of filters (default: ./filters.json).
        #[arg(short = 'f', long = "filters")]
        filters: Option<PathBuf>,
    },

    /// Group filter definitions by table and print them aligned.
    Aggregate {
        /// Filter definition list (default: ./filters.json).
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,
        /// Also save the report to a text file.
        #[arg(short = 's', long = "save")]
        save: bool,
        /// Output file for --save (default: ./aggregated_filters.txt).
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },

    /// List report folders grouped by the semantic model they point at.
    Models,
}

fn main() {
    let cli = Cli::parse();

    let base_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: cannot determine the working directory: {e}");
            std::process::exit(1);
        }
    };

    let (mut config, warnings) = match load_config(cli.config.as_deref(), &base_dir) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    util::logging::init(cli.debug, config.log_level.as_deref());
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    if let Some(root) = cli.root.clone() {
        config.root = root;
    }
    if let Some(path) = cli.reference_path.clone() {
        config.reference_path = Some(path);
    }

    tracing::debug!(
        version = util::constants::APP_VERSION,
        root = %config.root.display(),
        reference_path = ?config.reference_path,
        "pbir-filters starting"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = execute(cli.command.unwrap_or(Command::Run), config, &mut out) {
        tracing::error!(error = %e, "Run aborted");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn execute<W: Write>(command: Command, mut config: AppConfig, out: &mut W) -> Result<()> {
    match command {
        Command::Run => {
            pipeline::run(&config, out)?;
        }
        Command::Count { active, inactive } => {
            let kind = if active {
                CountKind::Active
            } else if inactive {
                CountKind::Inactive
            } else {
                CountKind::All
            };
            let files = discover_reports(&config.root, &config.discovery())?.reports;
            writeln!(out, "{}:", kind.label())?;
            reconcile::count_all(&files, kind, out)?;
        }
        Command::Prune => {
            let files = discover_reports(&config.root, &config.discovery())?.reports;
            let done = reconcile::delete_inactive_all(&files);
            writeln!(
                out,
                "Removed {} inactive filters from {} reports ({} skipped)",
                done.changed, done.processed, done.skipped
            )?;
        }
        Command::Append { filters } => {
            let source = filters.unwrap_or_else(|| config.filters_source.clone());
            let new_filters = reconcile::load_filter_source(&source)?;
            let files = discover_reports(&config.root, &config.discovery())?.reports;
            let done = reconcile::append_all(&files, &new_filters);
            writeln!(
                out,
                "Appended {} filters across {} reports ({} skipped)",
                done.changed, done.processed, done.skipped
            )?;
        }
        Command::Update { filters } => {
            let source = filters.unwrap_or_else(|| config.filters_source.clone());
            let new_filters = reconcile::load_filter_source(&source)?;
            let files = discover_reports(&config.root, &config.discovery())?.reports;
            let done = reconcile::update_all(&files, &new_filters);
            writeln!(
                out,
                "Replaced filters in {} reports ({} skipped)",
                done.processed, done.skipped
            )?;
        }
        Command::Aggregate {
            input,
            save,
            output,
        } => {
            if let Some(input) = input {
                config.aggregate_input = input;
            }
            if let Some(output) = output {
                config.aggregate_output = output;
            }
            let text = summary::aggregate_file(&config.aggregate_input, config.key_width)?;
            writeln!(out, "{text}")?;
            if save || config.save_aggregate {
                summary::save_aggregate(&config.aggregate_output, &text)?;
                writeln!(out, "{}", summary::saved_notice(&config.aggregate_output))?;
            }
        }
        Command::Models => {
            let text = summary::model_summary(&config.root, &config.discovery())?;
            writeln!(out, "{text}")?;
        }
    }
    Ok(())
}
