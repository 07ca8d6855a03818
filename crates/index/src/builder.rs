//! The emit/group/reduce index build pipeline
//!
//! A build runs in four steps:
//!
//! 1. *Emit*: per record, derive all (term, record ID) pairs. Records are
//!    independent, so this runs on the rayon pool.
//! 2. *Group*: collect pairs by term. Each worker folds into a local map
//!    and the maps are merged; this is the map/reduce synchronization
//!    boundary.
//! 3. *Reduce*: per term, sort record IDs lexicographically and
//!    deduplicate. The result is deterministic regardless of emission
//!    order.
//! 4. *Publish*: write every posting list into a fresh store generation
//!    and swap it active in one step. A store failure surviving the
//!    bounded retries aborts the build before the swap, so queries keep
//!    serving the previous generation.
//!
//! Records whose term generation fails are skipped with a warning and
//! reported in the [`BuildReport`], never silently dropped.

use std::collections::HashMap;

use gamefinder_core::{GameRecord, GenerationId, PostingStore, RecordId, Result};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::terms::generate_terms;

/// How often a retriable store operation is attempted before giving up
const STORE_ATTEMPTS: usize = 3;

/// Outcome of one index build
#[derive(Debug)]
pub struct BuildReport {
    /// The generation the build published
    pub generation: GenerationId,
    /// Records whose terms made it into the index
    pub records_indexed: usize,
    /// Distinct terms written
    pub terms_written: usize,
    /// Records skipped during emit, with the reason
    pub skipped: Vec<(RecordId, String)>,
}

/// Builds posting lists and publishes them as a new store generation
///
/// Owns posting-list construction: during a build it is the only writer of
/// the posting store. Each build fully replaces the prior index.
pub struct IndexBuilder<'a> {
    postings: &'a dyn PostingStore,
}

impl<'a> IndexBuilder<'a> {
    /// Create a builder writing to the given posting store
    pub fn new(postings: &'a dyn PostingStore) -> Self {
        IndexBuilder { postings }
    }

    /// Run the full pipeline over `records` and swap the result active
    ///
    /// # Errors
    ///
    /// Returns the store error if any write fails after retries; in that
    /// case no swap happens and the previously active generation keeps
    /// serving queries.
    pub fn build(&self, records: &[GameRecord]) -> Result<BuildReport> {
        // Emit: embarrassingly parallel, no shared mutable state.
        let emitted: Vec<(RecordId, Result<Vec<(String, RecordId)>>)> = records
            .par_iter()
            .map(|record| (record.id().clone(), generate_terms(record)))
            .collect();

        let mut skipped = Vec::new();
        let mut pairs: Vec<Vec<(String, RecordId)>> = Vec::with_capacity(emitted.len());
        for (id, result) in emitted {
            match result {
                Ok(record_pairs) => pairs.push(record_pairs),
                Err(err) => {
                    warn!(record = %id, error = %err, "skipping record during index build");
                    skipped.push((id, err.to_string()));
                }
            }
        }
        let records_indexed = pairs.len();

        // Group: per-worker partial maps, merged at the reduce boundary.
        let mut grouped: HashMap<String, Vec<RecordId>> = pairs
            .into_par_iter()
            .flatten()
            .fold(HashMap::new, |mut acc, (term, id)| {
                acc.entry(term).or_insert_with(Vec::new).push(id);
                acc
            })
            .reduce(HashMap::new, merge_groups);

        // Reduce: dedup + sort makes each posting list deterministic and
        // independent of emission order.
        for ids in grouped.values_mut() {
            ids.sort();
            ids.dedup();
        }

        // Publish into a fresh generation, then swap it active.
        let generation = with_retries(|| self.postings.begin_generation())?;
        for (term, ids) in &grouped {
            with_retries(|| self.postings.put_postings(generation, term, ids))?;
        }
        with_retries(|| self.postings.swap_active_generation(generation))?;

        debug!(
            %generation,
            records_indexed,
            terms = grouped.len(),
            "index build published"
        );

        Ok(BuildReport {
            generation,
            records_indexed,
            terms_written: grouped.len(),
            skipped,
        })
    }
}

fn merge_groups(
    mut left: HashMap<String, Vec<RecordId>>,
    right: HashMap<String, Vec<RecordId>>,
) -> HashMap<String, Vec<RecordId>> {
    for (term, ids) in right {
        left.entry(term).or_insert_with(Vec::new).extend(ids);
    }
    left
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

#[cfg(test)]
mod tests {
    use super::*;
    use gamefinder_core::Error;
    use gamefinder_store::MemoryStore;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(source: &str, line: usize, white: &str, moves: &str) -> GameRecord {
        GameRecord::new(
            RecordId::new(source, line),
            vec![("White".to_string(), white.to_string())],
            moves.to_string(),
        )
    }

    fn postings_for(store: &MemoryStore, exact_term: &str) -> Vec<RecordId> {
        store
            .find_terms_containing(exact_term)
            .unwrap()
            .into_iter()
            .find(|(term, _)| term == exact_term)
            .map(|(_, ids)| ids)
            .unwrap_or_default()
    }

    #[test]
    fn test_build_groups_records_by_term() {
        let store = MemoryStore::new();
        let records = vec![
            record("a.pgn", 1, "Same", "1. e4 e5"),
            record("a.pgn", 9, "Same", "1. d4 d5"),
        ];

        let report = IndexBuilder::new(&store).build(&records).unwrap();
        assert_eq!(report.records_indexed, 2);
        assert!(report.skipped.is_empty());

        let ids = postings_for(&store, "White:Same");
        assert_eq!(
            ids,
            vec![RecordId::new("a.pgn", 1), RecordId::new("a.pgn", 9)]
        );
    }

    #[test]
    fn test_posting_lists_are_sorted_and_deduplicated() {
        let store = MemoryStore::new();
        // "b.pgn:2" sorts before "b.pgn:10" is false lexicographically:
        // "b.pgn:10" < "b.pgn:2". Feed them in the opposite order.
        let records = vec![
            record("b.pgn", 2, "X", "1. e4 e5"),
            record("b.pgn", 10, "X", "1. e4 e5"),
        ];

        IndexBuilder::new(&store).build(&records).unwrap();

        let ids = postings_for(&store, "White:X");
        assert_eq!(
            ids,
            vec![RecordId::new("b.pgn", 10), RecordId::new("b.pgn", 2)]
        );
    }

    #[test]
    fn test_rebuild_fully_replaces_prior_index() {
        let store = MemoryStore::new();
        let builder = IndexBuilder::new(&store);

        builder
            .build(&[record("a.pgn", 1, "Old", "1. e4 e5")])
            .unwrap();
        builder
            .build(&[record("a.pgn", 1, "New", "1. d4 d5")])
            .unwrap();

        assert!(postings_for(&store, "White:Old").is_empty());
        assert_eq!(
            postings_for(&store, "White:New"),
            vec![RecordId::new("a.pgn", 1)]
        );
    }

    #[test]
    fn test_record_without_moves_is_indexed_by_field_terms() {
        let store = MemoryStore::new();
        let records = vec![
            record("a.pgn", 1, "Good", "1. e4 e5"),
            record("a.pgn", 7, "Bad", ""),
        ];

        let report = IndexBuilder::new(&store).build(&records).unwrap();
        assert_eq!(report.records_indexed, 2);
        assert!(report.skipped.is_empty());
        assert!(!postings_for(&store, "White:Good").is_empty());
        assert_eq!(
            postings_for(&store, "White:Bad"),
            vec![RecordId::new("a.pgn", 7)]
        );
    }

    // Posting store that fails a fixed number of put calls, then recovers.
    struct FlakyStore {
        inner: MemoryStore,
        failures_left: AtomicUsize,
    }

    impl FlakyStore {
        fn failing(n: usize) -> Self {
            FlakyStore {
                inner: MemoryStore::new(),
                failures_left: AtomicUsize::new(n),
            }
        }
    }

    impl PostingStore for FlakyStore {
        fn begin_generation(&self) -> Result<GenerationId> {
            self.inner.begin_generation()
        }

        fn put_postings(
            &self,
            generation: GenerationId,
            term: &str,
            ids: &[RecordId],
        ) -> Result<()> {
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(Error::StoreUnavailable("injected".to_string()));
            }
            self.inner.put_postings(generation, term, ids)
        }

        fn swap_active_generation(&self, generation: GenerationId) -> Result<()> {
            self.inner.swap_active_generation(generation)
        }

        fn find_terms_containing(&self, needle: &str) -> Result<Vec<(String, Vec<RecordId>)>> {
            self.inner.find_terms_containing(needle)
        }
    }

    #[test]
    fn test_transient_store_failures_are_retried() {
        let store = FlakyStore::failing(2);
        let report = IndexBuilder::new(&store)
            .build(&[record("a.pgn", 1, "A", "1. e4 e5")])
            .unwrap();
        assert_eq!(report.records_indexed, 1);
    }

    #[test]
    fn test_failed_build_keeps_previous_generation() {
        let store = FlakyStore::failing(0);
        let builder = IndexBuilder::new(&store);
        builder
            .build(&[record("a.pgn", 1, "Old", "1. e4 e5")])
            .unwrap();

        // Enough injected failures to exhaust every retry.
        store.failures_left.store(100, Ordering::SeqCst);
        let err = builder
            .build(&[record("a.pgn", 1, "New", "1. d4 d5")])
            .unwrap_err();
        assert!(err.is_retriable());

        // The old generation is still the one queries see.
        let old = store.find_terms_containing("White:Old").unwrap();
        assert_eq!(old.len(), 1);
        assert!(store.find_terms_containing("White:New").unwrap().is_empty());

        // The aborted build's pending generation is reclaimed once a
        // later build publishes.
        store.failures_left.store(0, Ordering::SeqCst);
        builder
            .build(&[record("a.pgn", 1, "New", "1. d4 d5")])
            .unwrap();
        assert_eq!(store.inner.pending_generation_count(), 0);
        assert_eq!(store.find_terms_containing("White:New").unwrap().len(), 1);
    }

    proptest! {
        /// Reduce output is independent of record emission order.
        #[test]
        fn prop_build_is_order_independent(seed in any::<proptest::sample::Index>()) {
            let mut records = vec![
                record("p.pgn", 1, "A", "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6"),
                record("p.pgn", 8, "B", "1. e4 e5 2. Nf3 Nf6 3. Nxe5 d6"),
                record("p.pgn", 15, "A", "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6"),
                record("p.pgn", 22, "C", "1. d4 d5 2. c4 e6 3. Nc3 Nf6"),
            ];

            let baseline = MemoryStore::new();
            IndexBuilder::new(&baseline).build(&records).unwrap();
            let expected = baseline.find_terms_containing("").unwrap();

            let len = records.len();
            records.rotate_left(seed.index(len));
            records.reverse();

            let permuted = MemoryStore::new();
            IndexBuilder::new(&permuted).build(&records).unwrap();
            let actual = permuted.find_terms_containing("").unwrap();

            prop_assert_eq!(expected, actual);
        }
    }
}
