//! GameFinder - inverted-index search over PGN chess game archives
//!
//! GameFinder parses PGN sources into records, derives index terms from
//! their metadata and move sequences, builds deduplicated sorted posting
//! lists via an emit/group/reduce pipeline, and answers multi-term boolean
//! queries by intersecting posting lists.
//!
//! # Quick Start
//!
//! ```
//! use gamefinder::GameFinder;
//!
//! # fn main() -> gamefinder::Result<()> {
//! let finder = GameFinder::in_memory();
//! finder.ingest_text("opening.pgn", "[Event \"Casual\"]\n[White \"A\"]\n1. e4 e5 2. Nf3 Nc6 3. Bb5 a6\n")?;
//! let hits = finder.query("White:A")?;
//! assert_eq!(hits.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! The member crates are layered leaf-first: `gamefinder-core` (types,
//! errors, store traits), `gamefinder-pgn` (record parsing),
//! `gamefinder-index` (term generation and the build pipeline),
//! `gamefinder-store` (in-memory reference store), and `gamefinder-query`
//! (boolean evaluation). This crate wires them together behind the
//! [`GameFinder`] facade and the thin CLI binary.

#![warn(clippy::all)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

pub use gamefinder_core::{
    Error, GameRecord, GenerationId, PostingStore, RecordId, RecordStore, Result, TermMatcher,
};
pub use gamefinder_index::{BuildReport, IndexBuilder};
pub use gamefinder_pgn::{parse_game, parse_source, split_games};
pub use gamefinder_query::QueryEvaluator;
pub use gamefinder_store::MemoryStore;

/// How often a retriable store write is attempted before giving up
const STORE_ATTEMPTS: usize = 3;

/// File extension of PGN sources picked up by [`GameFinder::ingest_dir`]
const PGN_EXTENSION: &str = "pgn";

/// Outcome of one ingestion run
#[derive(Debug)]
pub struct IngestReport {
    /// Sources that parsed and were persisted
    pub files_ingested: usize,
    /// Records persisted across all sources
    pub records_ingested: usize,
    /// Sources that failed, with the failure; the run continued without them
    pub failed_files: Vec<(PathBuf, Error)>,
    /// Report of the index rebuild that followed ingestion
    pub build: BuildReport,
}

/// End-to-end facade: ingestion, index builds, and queries
///
/// Store handles are injected; [`GameFinder::in_memory`] wires the
/// reference [`MemoryStore`] behind both.
pub struct GameFinder {
    records: Arc<dyn RecordStore>,
    postings: Arc<dyn PostingStore>,
}

impl GameFinder {
    /// Create a finder over explicit store handles
    pub fn new(records: Arc<dyn RecordStore>, postings: Arc<dyn PostingStore>) -> Self {
        GameFinder { records, postings }
    }

    /// Create a finder backed by the in-memory reference store
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        GameFinder {
            records: store.clone(),
            postings: store,
        }
    }

    /// Ingest every `*.pgn` file in `folder`, then rebuild the index
    ///
    /// Files are visited in sorted order. A file that fails to read or
    /// parse is logged, reported in the result, and skipped; the remaining
    /// files still ingest. The rebuild scans the full record corpus, so
    /// repeated ingests accumulate.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be enumerated or the index
    /// rebuild fails; per-file failures are reported, not returned.
    pub fn ingest_dir(&self, folder: &Path) -> Result<IngestReport> {
        let mut sources: Vec<PathBuf> = std::fs::read_dir(folder)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == PGN_EXTENSION))
            .collect();
        sources.sort();

        let mut files_ingested = 0;
        let mut records_ingested = 0;
        let mut failed_files = Vec::new();

        for path in sources {
            match self.ingest_file(&path) {
                Ok(count) => {
                    files_ingested += 1;
                    records_ingested += count;
                }
                Err(err) => {
                    error!(file = %path.display(), error = %err, "failed to ingest source");
                    failed_files.push((path, err));
                }
            }
        }

        let build = self.rebuild_index()?;
        info!(
            files_ingested,
            records_ingested,
            failed = failed_files.len(),
            generation = %build.generation,
            "ingestion complete"
        );

        Ok(IngestReport {
            files_ingested,
            records_ingested,
            failed_files,
            build,
        })
    }

    /// Ingest one in-memory source, then rebuild the index
    ///
    /// `source_name` becomes the prefix of the records' IDs.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed text, or a store error if
    /// persistence or the rebuild fails.
    pub fn ingest_text(&self, source_name: &str, contents: &str) -> Result<BuildReport> {
        self.persist_records(parse_source(source_name, contents)?)?;
        self.rebuild_index()
    }

    /// Evaluate a query against the active index generation
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQuery`] for a blank query, or a store error
    /// if lookup fails.
    pub fn query(&self, text: &str) -> Result<Vec<GameRecord>> {
        QueryEvaluator::new(self.postings.as_ref(), self.records.as_ref()).query(text)
    }

    /// Rebuild the posting index from a full record scan and swap it active
    ///
    /// # Errors
    ///
    /// Returns a store error if the scan or the build fails; a failed build
    /// never unpublishes the previous generation.
    pub fn rebuild_index(&self) -> Result<BuildReport> {
        let records = self.records.scan_records()?;
        let report = IndexBuilder::new(self.postings.as_ref()).build(&records)?;
        for (id, reason) in &report.skipped {
            warn!(record = %id, reason, "record excluded from index");
        }
        Ok(report)
    }

    fn ingest_file(&self, path: &Path) -> Result<usize> {
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let contents = std::fs::read_to_string(path)?;
        let records = parse_source(&source_name, &contents)?;
        self.persist_records(records)
    }

    fn persist_records(&self, records: Vec<GameRecord>) -> Result<usize> {
        let count = records.len();
        for record in records {
            with_retries(|| self.records.put_record(record.clone()))?;
        }
        Ok(count)
    }
}

/// Run a store operation with bounded retries on transient failure
fn with_retries<T>(mut op: impl FnMut() -> Result<T>) -> Result<T> {
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retriable() && attempt < STORE_ATTEMPTS => {
                warn!(attempt, error = %err, "retrying store operation");
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
