// pbir-filters - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "pbir-filters";

/// Application identifier used for the platform config directory.
pub const APP_ID: &str = "pbir-filters";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Report folder layout
// =============================================================================

/// Marker file recording which semantic model a report folder is bound to.
pub const DEFINITION_FILE_NAME: &str = "definition.pbir";

/// Report document carrying the string-encoded `filters` field.
pub const REPORT_FILE_NAME: &str = "report.json";

/// Suffix stripped from a report folder name to get its display name.
pub const REPORT_FOLDER_SUFFIX: &str = ".Report";

/// Placeholder reported by the model lister when a definition has no path.
pub const MISSING_REFERENCE_PATH: &str = "Path not found";

/// Field of the report document that holds the encoded filter list.
pub const FILTERS_FIELD: &str = "filters";

/// Key whose presence marks a filter entry as active.
pub const ACTIVE_FILTER_KEY: &str = "filter";

// =============================================================================
// Input / output files
// =============================================================================

/// Canonical new-filter set, also the default aggregation input.
pub const FILTERS_FILE_NAME: &str = "filters.json";

/// Default file the aggregation report is saved to.
pub const AGGREGATE_OUTPUT_FILE_NAME: &str = "aggregated_filters.txt";

/// Width the property/level column is padded to in the aggregation report.
pub const DEFAULT_AGGREGATE_KEY_WIDTH: usize = 60;

/// Upper bound on the configurable key width.
pub const MAX_AGGREGATE_KEY_WIDTH: usize = 200;

/// Indentation used when rewriting report documents.
pub const JSON_INDENT: &[u8] = b"    ";

/// Extension appended to a target file name while it is being rewritten.
pub const TEMP_FILE_SUFFIX: &str = "tmp";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
