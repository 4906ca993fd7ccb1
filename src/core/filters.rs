// pbir-filters - core/filters.rs
//
// Filter list reconciliation: the encode/decode boundary of the
// string-encoded `filters` field, plus the pure list operations the batch
// layer applies to every report.
// Core layer: pure logic, no I/O.

use crate::core::model::FilterEntry;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::io;

// =============================================================================
// Encoding
// =============================================================================

/// Compact JSON with a space after every `,` and `:`.
///
/// This is the shape report files store their filter blobs in, e.g.
/// `[{"name": "a"}, {"name": "b"}]`.
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn to_spaced_string<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut ser)?;
    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Serialise a filter list into the string stored in the `filters` field.
pub fn encode_filters(entries: &[FilterEntry]) -> Result<String, serde_json::Error> {
    to_spaced_string(entries)
}

/// Why a `filters` string could not be decoded.
#[derive(Debug)]
pub enum DecodeFailure {
    /// Not valid JSON.
    Malformed(serde_json::Error),
    /// Valid JSON, but not an array.
    NotArray,
}

/// Parse the string stored in the `filters` field back into a list.
pub fn decode_filters(raw: &str) -> Result<Vec<FilterEntry>, DecodeFailure> {
    match serde_json::from_str::<Value>(raw).map_err(DecodeFailure::Malformed)? {
        Value::Array(items) => Ok(items.into_iter().map(FilterEntry).collect()),
        _ => Err(DecodeFailure::NotArray),
    }
}

/// Key used for duplicate detection.
///
/// Purely syntactic: two entries with the same keys in a different order
/// produce different keys and are both kept. The key is the compact
/// serialisation of the entry, in loaded key order.
pub fn canonical_key(entry: &FilterEntry) -> String {
    entry.as_value().to_string()
}

// =============================================================================
// List operations
// =============================================================================

/// Append every entry of `new_entries` not already present in `existing`.
///
/// Presence is decided by [`canonical_key`]. Entries appended earlier in the
/// same call count as present, so a duplicated candidate is added once.
/// Returns the number of entries appended.
pub fn append_unique(existing: &mut Vec<FilterEntry>, new_entries: &[FilterEntry]) -> usize {
    let mut seen: HashSet<String> = existing.iter().map(canonical_key).collect();
    let before = existing.len();
    for entry in new_entries {
        if seen.insert(canonical_key(entry)) {
            existing.push(entry.clone());
        }
    }
    existing.len() - before
}

/// Drop every inactive entry. Returns the number removed.
pub fn retain_active(entries: &mut Vec<FilterEntry>) -> usize {
    let before = entries.len();
    entries.retain(FilterEntry::is_active);
    before - entries.len()
}

/// Per-report filter statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

/// Count entries by activity. `total == active + inactive` always holds.
pub fn count(entries: &[FilterEntry]) -> FilterCounts {
    let active = entries.iter().filter(|e| e.is_active()).count();
    FilterCounts {
        total: entries.len(),
        active,
        inactive: entries.len() - active,
    }
}

/// Which of the three counts a count report prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountKind {
    All,
    Active,
    Inactive,
}

impl CountKind {
    /// Heading printed above a count report.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    pub fn select(self, counts: FilterCounts) -> usize {
        match self {
            Self::All => counts.total,
            Self::Active => counts.active,
            Self::Inactive => counts.inactive,
        }
    }
}
