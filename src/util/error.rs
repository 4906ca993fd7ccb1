// pbir-filters - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Every variant carries the path it concerns so a logged error always names
// the offending file alongside the underlying cause.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all pbir-filters operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum PbirError {
    /// Directory discovery failed.
    Discovery(DiscoveryError),

    /// A JSON document could not be read, decoded, encoded or written.
    Document(DocumentError),

    /// Configuration loading failed.
    Config(ConfigError),

    /// Writing a report to the output stream failed.
    Output(io::Error),
}

impl fmt::Display for PbirError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Document(e) => write!(f, "Document error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Output(e) => write!(f, "Failed to write report output: {e}"),
        }
    }
}

impl std::error::Error for PbirError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Document(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Output(e) => Some(e),
        }
    }
}

impl From<io::Error> for PbirError {
    fn from(e: io::Error) -> Self {
        Self::Output(e)
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors that stop a discovery walk before it starts.
///
/// Per-directory failures are never reported through this type; they are
/// collected as [`DocumentError`]s in the discovery result instead.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The root scan path does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The root path is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the root path.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// Filtered discovery was requested without an expected reference path.
    MissingReferencePath,
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Scan path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Scan path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::MissingReferencePath => write!(
                f,
                "No semantic model reference path configured. \
                 Pass --reference-path or set [discovery] reference_path in config.toml."
            ),
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for PbirError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Document errors
// ---------------------------------------------------------------------------

/// Errors reading or writing a single JSON document on disk.
#[derive(Debug)]
pub enum DocumentError {
    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },

    /// The file is not valid JSON, or could not be serialised back.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A report document's top level is not a JSON object.
    NotAnObject { path: PathBuf },

    /// A JSON array was expected (filters source, aggregation input).
    NotAnArray { path: PathBuf },

    /// The report's `filters` field exists but is not a string.
    FiltersNotString { path: PathBuf },

    /// The report's `filters` string does not hold valid JSON.
    FiltersMalformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The report's `filters` string holds JSON that is not an array.
    FiltersNotArray { path: PathBuf },
}

impl DocumentError {
    /// Path of the document the error concerns.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. }
            | Self::Json { path, .. }
            | Self::NotAnObject { path }
            | Self::NotAnArray { path }
            | Self::FiltersNotString { path }
            | Self::FiltersMalformed { path, .. }
            | Self::FiltersNotArray { path } => path,
        }
    }
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
            Self::Json { path, source } => {
                write!(f, "Invalid JSON in '{}': {source}", path.display())
            }
            Self::NotAnObject { path } => {
                write!(f, "'{}' is not a JSON object", path.display())
            }
            Self::NotAnArray { path } => {
                write!(f, "'{}' is not a JSON array", path.display())
            }
            Self::FiltersNotString { path } => write!(
                f,
                "'{}': the filters field is not a string-encoded list",
                path.display()
            ),
            Self::FiltersMalformed { path, source } => write!(
                f,
                "'{}': the filters field does not hold valid JSON: {source}",
                path.display()
            ),
            Self::FiltersNotArray { path } => write!(
                f,
                "'{}': the filters field does not hold a JSON array",
                path.display()
            ),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::FiltersMalformed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DocumentError> for PbirError {
    fn from(e: DocumentError) -> Self {
        Self::Document(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config file named explicitly on the command line does not exist.
    NotFound { path: PathBuf },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::NotFound { path } => {
                write!(f, "Config file '{}' does not exist", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<ConfigError> for PbirError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for pbir-filters results.
pub type Result<T> = std::result::Result<T, PbirError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_document_error_names_path_and_cause() {
        let err = DocumentError::Io {
            path: PathBuf::from("Sales.Report/report.json"),
            operation: "read",
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        let text = err.to_string();
        assert!(text.contains("Sales.Report/report.json"), "got: {text}");
        assert!(text.contains("gone"), "got: {text}");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_top_level_error_keeps_chain() {
        let err: PbirError = DiscoveryError::RootNotFound {
            path: PathBuf::from("/nowhere"),
        }
        .into();
        assert!(err.to_string().starts_with("Discovery error:"));
        assert!(err.source().is_some());
    }
}
