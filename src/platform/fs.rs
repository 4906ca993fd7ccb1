// pbir-filters - platform/fs.rs
//
// Filesystem access for JSON documents and text reports.
//
// All writes are atomic: content goes to a sibling temp file, is synced to
// disk, and is then renamed over the target, so a crash mid-write leaves
// either the old file or the new one, never a truncated mix.

use crate::core::report::ReportDocument;
use crate::util::constants::TEMP_FILE_SUFFIX;
use crate::util::error::DocumentError;
use serde_json::Value;
use std::ffi::OsString;
use std::fs::{File, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Read a whole file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String, DocumentError> {
    std::fs::read_to_string(path).map_err(|e| DocumentError::Io {
        path: path.to_path_buf(),
        operation: "read",
        source: e,
    })
}

/// Read and parse a JSON document.
pub fn read_json(path: &Path) -> Result<Value, DocumentError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|e| DocumentError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read a JSON document whose top level must be an array.
pub fn read_json_array(path: &Path) -> Result<Vec<Value>, DocumentError> {
    match read_json(path)? {
        Value::Array(items) => Ok(items),
        _ => Err(DocumentError::NotAnArray {
            path: path.to_path_buf(),
        }),
    }
}

/// Read and parse a report document.
pub fn read_report(path: &Path) -> Result<ReportDocument, DocumentError> {
    let text = read_text(path)?;
    ReportDocument::parse(path, &text)
}

/// Serialise a report document and write it back to its own path.
pub fn write_report(report: &ReportDocument) -> Result<(), DocumentError> {
    let json = report.to_pretty_json()?;
    write_atomic(report.path(), json.as_bytes())
}

/// Sibling path used while `path` is being rewritten.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(TEMP_FILE_SUFFIX);
    path.with_file_name(name)
}

/// Write `bytes` to `path` atomically (write temp, fsync, rename over target).
///
/// A symlinked `path` is resolved first so the link survives and its target
/// receives the new content. An existing read-only file is refused with a
/// `PermissionDenied` error; otherwise its permissions carry over.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DocumentError> {
    let target = resolve_target(path)?;
    let existing = match std::fs::metadata(&target) {
        Ok(meta) => Some(meta.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(io_error(&target, "stat", e)),
    };
    if existing.as_ref().is_some_and(|p| p.readonly()) {
        return Err(io_error(
            &target,
            "write",
            io::Error::new(io::ErrorKind::PermissionDenied, "file is read-only"),
        ));
    }

    let tmp = temp_path_for(&target);
    let written = write_synced(&tmp, bytes, existing)
        .map_err(|e| io_error(&tmp, "write", e))
        .and_then(|()| {
            std::fs::rename(&tmp, &target).map_err(|e| io_error(&target, "rename", e))
        });
    if written.is_err() {
        // Ignore any secondary error.
        let _ = std::fs::remove_file(&tmp);
    }
    written?;

    tracing::debug!(path = %target.display(), bytes = bytes.len(), "File written");
    Ok(())
}

/// Follow `path` through any symlinks; a plain or missing file is returned as is.
fn resolve_target(path: &Path) -> Result<PathBuf, DocumentError> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            std::fs::canonicalize(path).map_err(|e| io_error(path, "resolve", e))
        }
        _ => Ok(path.to_path_buf()),
    }
}

fn write_synced(tmp: &Path, bytes: &[u8], permissions: Option<Permissions>) -> io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(bytes)?;
    if let Some(permissions) = permissions {
        file.set_permissions(permissions)?;
    }
    file.sync_all()
}

fn io_error(path: &Path, operation: &'static str, source: io::Error) -> DocumentError {
    DocumentError::Io {
        path: path.to_path_buf(),
        operation,
        source,
    }
}
