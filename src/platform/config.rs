// pbir-filters - platform/config.rs
//
// config.toml loading with startup validation, and platform config directory
// resolution via the `directories` crate.
//
// Lookup order: explicit --config path, then ./config.toml, then the
// platform config directory (e.g. ~/.config/pbir-filters/config.toml).
// Relative paths inside the file resolve against the working directory.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

// =============================================================================
// Raw file shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[discovery]` section.
    pub discovery: DiscoverySection,
    /// `[filters]` section.
    pub filters: FiltersSection,
    /// `[aggregate]` section.
    pub aggregate: AggregateSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    /// Directory to scan for report folders.
    pub root: Option<String>,
    /// Semantic model path reports must be bound to.
    pub reference_path: Option<String>,
    /// Maximum directory recursion depth (unbounded when unset).
    pub max_depth: Option<usize>,
    /// Directory name glob patterns never descended into (none when unset).
    pub exclude_patterns: Option<Vec<String>>,
}

/// `[filters]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FiltersSection {
    /// JSON array of filters to append or overwrite with.
    pub source: Option<String>,
}

/// `[aggregate]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct AggregateSection {
    pub input: Option<String>,
    pub output: Option<String>,
    /// Save the report to `output` as well as printing it.
    pub save: Option<bool>,
    pub key_width: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

// =============================================================================
// Validated configuration
// =============================================================================

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Discovery --
    pub root: PathBuf,
    pub reference_path: Option<String>,
    pub max_depth: Option<usize>,
    pub exclude_patterns: Vec<String>,

    // -- Filters --
    pub filters_source: PathBuf,

    // -- Aggregate --
    pub aggregate_input: PathBuf,
    pub aggregate_output: PathBuf,
    pub save_aggregate: bool,
    pub key_width: usize,

    // -- Logging --
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Defaults relative to `base_dir`: scan its parent, read `filters.json`
    /// from it, and save the aggregation report beside it.
    pub fn defaults_for(base_dir: &Path) -> Self {
        Self {
            root: base_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| base_dir.to_path_buf()),
            reference_path: None,
            max_depth: None,
            exclude_patterns: Vec::new(),
            filters_source: base_dir.join(constants::FILTERS_FILE_NAME),
            aggregate_input: base_dir.join(constants::FILTERS_FILE_NAME),
            aggregate_output: base_dir.join(constants::AGGREGATE_OUTPUT_FILE_NAME),
            save_aggregate: false,
            key_width: constants::DEFAULT_AGGREGATE_KEY_WIDTH,
            log_level: None,
        }
    }

    /// Discovery settings derived from this configuration.
    pub fn discovery(&self) -> crate::core::discovery::DiscoveryConfig {
        crate::core::discovery::DiscoveryConfig {
            reference_path: self.reference_path.clone(),
            max_depth: self.max_depth,
            exclude_patterns: self.exclude_patterns.clone(),
        }
    }
}

/// Config file in the platform config directory, if one can be determined.
pub fn platform_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", constants::APP_ID)
        .map(|dirs| dirs.config_dir().join(constants::CONFIG_FILE_NAME))
}

/// Load and validate configuration.
///
/// `explicit` is a path named on the command line: it must exist and parse,
/// otherwise an error is returned. Without it, the first config.toml found in
/// `base_dir` or the platform config directory is used; a missing file means
/// defaults, an unreadable or unparseable one means defaults plus a warning.
///
/// Returns the validated config and a list of non-fatal warnings, which the
/// caller logs once tracing is initialised.
pub fn load_config(
    explicit: Option<&Path>,
    base_dir: &Path,
) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let mut warnings: Vec<String> = Vec::new();

    let raw = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
            toml::from_str::<RawConfig>(&content).map_err(|e| ConfigError::TomlParse {
                path: path.to_path_buf(),
                source: e,
            })?
        }
        None => {
            let found = std::iter::once(base_dir.join(constants::CONFIG_FILE_NAME))
                .chain(platform_config_path())
                .find(|p| p.exists());
            match found {
                Some(path) => read_lenient(&path, &mut warnings),
                None => RawConfig::default(),
            }
        }
    };

    Ok((validate(raw, base_dir, &mut warnings), warnings))
}

/// Read a discovered (not explicitly requested) config file, falling back to
/// defaults with a warning on any failure.
fn read_lenient(path: &Path, warnings: &mut Vec<String>) -> RawConfig {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warnings.push(format!(
                "Could not read config file '{}': {e}. Using defaults.",
                path.display()
            ));
            return RawConfig::default();
        }
    };
    match toml::from_str(&content) {
        Ok(raw) => raw,
        Err(e) => {
            warnings.push(format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                path.display()
            ));
            RawConfig::default()
        }
    }
}

/// Validate each field against named constants, accumulating all warnings.
fn validate(raw: RawConfig, base_dir: &Path, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::defaults_for(base_dir);
    let resolve = |p: &str| base_dir.join(p);

    // -- Discovery --
    if let Some(ref root) = raw.discovery.root {
        config.root = resolve(root);
    }
    if let Some(path) = raw.discovery.reference_path {
        if path.is_empty() {
            warnings.push("[discovery] reference_path is empty; ignoring it.".to_string());
        } else {
            config.reference_path = Some(path);
        }
    }
    if let Some(depth) = raw.discovery.max_depth {
        if depth >= 1 {
            config.max_depth = Some(depth);
        } else {
            warnings.push(format!(
                "[discovery] max_depth = {depth} must be at least 1. Walking the whole tree."
            ));
        }
    }
    if let Some(patterns) = raw.discovery.exclude_patterns {
        config.exclude_patterns = patterns;
    }

    // -- Filters --
    if let Some(ref source) = raw.filters.source {
        config.filters_source = resolve(source);
    }

    // -- Aggregate --
    if let Some(ref input) = raw.aggregate.input {
        config.aggregate_input = resolve(input);
    }
    if let Some(ref output) = raw.aggregate.output {
        config.aggregate_output = resolve(output);
    }
    if let Some(save) = raw.aggregate.save {
        config.save_aggregate = save;
    }
    if let Some(width) = raw.aggregate.key_width {
        if width <= constants::MAX_AGGREGATE_KEY_WIDTH {
            config.key_width = width;
        } else {
            warnings.push(format!(
                "[aggregate] key_width = {width} is out of range (0-{}). Using default ({}).",
                constants::MAX_AGGREGATE_KEY_WIDTH,
                constants::DEFAULT_AGGREGATE_KEY_WIDTH,
            ));
        }
    }

    // -- Logging --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    config
}
