//! Foundational identifier and record types

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// RecordId
// ============================================================================

/// Unique identifier for a parsed game record
///
/// Formatted as `"<sourceName>:<lineNumber>"` where the line number is the
/// 1-based line of the record's opening tag within its source file. Assigned
/// at parse time and immutable afterwards; this is the join key between the
/// record store and the posting lists.
///
/// The derived `Ord` is lexicographic on the ID string, which is the total
/// order posting lists are sorted by.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Build an ID from a source name and the 1-based start line of the record
    pub fn new(source: impl AsRef<str>, line: usize) -> Self {
        RecordId(format!("{}:{}", source.as_ref(), line))
    }

    /// The ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the ID back into its source name and start line
    ///
    /// Used for error reporting; the line is 0 if the ID does not carry a
    /// numeric suffix.
    pub fn parts(&self) -> (&str, usize) {
        match self.0.rsplit_once(':') {
            Some((source, line)) => (source, line.parse().unwrap_or(0)),
            None => (self.0.as_str(), 0),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// GameRecord
// ============================================================================

/// One parsed game
///
/// Holds the metadata fields in their order of appearance in the source text
/// (names unique, first occurrence wins) plus the raw move text. Every record
/// has a moves field, even if its text is empty; metadata fields are zero or
/// more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    id: RecordId,
    fields: Vec<(String, String)>,
    moves: String,
}

impl GameRecord {
    /// Assemble a record from parsed parts
    ///
    /// Duplicate field names keep the first occurrence.
    pub fn new(id: RecordId, fields: Vec<(String, String)>, moves: String) -> Self {
        let mut unique: Vec<(String, String)> = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            if !unique.iter().any(|(n, _)| *n == name) {
                unique.push((name, value));
            }
        }
        GameRecord {
            id,
            fields: unique,
            moves,
        }
    }

    /// The record's identifier
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Metadata fields in order of appearance
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Look up one metadata field by name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of metadata fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// The raw move text (trimmed, newlines removed)
    pub fn moves(&self) -> &str {
        &self.moves
    }
}

// ============================================================================
// GenerationId
// ============================================================================

/// Identifier for one immutable posting-list snapshot
///
/// A rebuild writes all posting lists into a fresh generation and then swaps
/// it active atomically, so readers never observe a mix of old and new
/// postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GenerationId(u64);

impl GenerationId {
    /// Wrap a raw generation number
    pub fn new(raw: u64) -> Self {
        GenerationId(raw)
    }

    /// The raw generation number
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}
