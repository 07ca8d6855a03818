//! Error types for GameFinder
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.

use crate::types::GenerationId;
use std::io;
use thiserror::Error;

/// Result type alias for GameFinder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the indexing and query engine
#[derive(Debug, Error)]
pub enum Error {
    /// Parse-time structural failure in a source file
    #[error("malformed record in {source_id} (line {line}): {reason}")]
    MalformedRecord {
        /// Identifier of the offending source (file name)
        source_id: String,
        /// 1-based line number where the record starts
        line: usize,
        /// What went wrong
        reason: String,
    },

    /// Transient failure against the store collaborator; eligible for retry
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Query contained zero terms after whitespace splitting
    #[error("empty query")]
    EmptyQuery,

    /// Posting write addressed a generation the store does not know
    #[error("unknown posting generation: {0}")]
    UnknownGeneration(GenerationId),

    /// I/O error (file enumeration, source reads)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this error indicates a transient failure worth retrying
    pub fn is_retriable(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_))
    }
}
