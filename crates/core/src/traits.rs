//! Store contracts for records and posting lists
//!
//! The store is an external collaborator. These traits are the seam that
//! lets the in-memory reference implementation be replaced by a durable
//! document/key-value store without touching the parser, builder, or
//! evaluator. Store handles are passed into each component explicitly;
//! there are no ambient singletons.

use crate::error::Result;
use crate::types::{GameRecord, GenerationId, RecordId};

/// Persistence of parsed game records, keyed by [`RecordId`]
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait RecordStore: Send + Sync {
    /// Persist one record under its ID
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StoreUnavailable`] on transient failure.
    fn put_record(&self, record: GameRecord) -> Result<()>;

    /// Fetch a record by ID
    ///
    /// Returns `None` if the ID is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    fn get_record(&self, id: &RecordId) -> Result<Option<GameRecord>>;

    /// Scan every stored record
    ///
    /// Used by index rebuilds, which always run over the full corpus.
    /// Order is unspecified; the builder's reduce step makes output
    /// deterministic regardless.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    fn scan_records(&self) -> Result<Vec<GameRecord>>;
}

/// Persistence of posting lists, organized into immutable generations
///
/// A build writes all posting lists into a fresh generation and then swaps
/// it active in one step. Readers only ever see the active generation, so a
/// rebuild is never observed partially.
pub trait PostingStore: Send + Sync {
    /// Open a fresh, not-yet-active generation for writing
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    fn begin_generation(&self) -> Result<GenerationId>;

    /// Write one term's posting list into a pending generation
    ///
    /// `ids` must already be deduplicated and sorted; the store persists
    /// them as given.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownGeneration`] if `generation` was never
    /// opened or has been retired.
    fn put_postings(&self, generation: GenerationId, term: &str, ids: &[RecordId]) -> Result<()>;

    /// Atomically make `generation` the one queries read from
    ///
    /// Prior generations are retired and may be discarded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownGeneration`] if `generation` was never
    /// opened.
    fn swap_active_generation(&self, generation: GenerationId) -> Result<()>;

    /// All terms in the active generation containing `needle`
    ///
    /// Matching is case-insensitive and literal (see [`crate::TermMatcher`]).
    /// Results come back in a deterministic term order together with their
    /// posting lists. With no active generation the result is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    fn find_terms_containing(&self, needle: &str) -> Result<Vec<(String, Vec<RecordId>)>>;
}
