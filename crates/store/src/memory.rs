//! In-memory generational store
//!
//! Records live in a concurrent map keyed by [`RecordId`]. Posting lists
//! live in per-generation sorted maps: a build writes into a pending
//! generation, and `swap_active_generation` publishes it in one step.
//! Readers clone an `Arc` of the active generation, so a swap never shows
//! them a mix of old and new postings.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use gamefinder_core::{
    Error, GameRecord, GenerationId, PostingStore, RecordId, RecordStore, Result, TermMatcher,
};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

/// Sorted term -> posting-list map for one generation
type Postings = BTreeMap<String, Vec<RecordId>>;

/// In-memory implementation of both store contracts
pub struct MemoryStore {
    records: DashMap<RecordId, GameRecord>,
    /// Generations opened for writing but not yet swapped active
    pending: Mutex<HashMap<GenerationId, Postings>>,
    /// The generation queries read from
    active: RwLock<Option<(GenerationId, Arc<Postings>)>>,
    next_generation: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        MemoryStore {
            records: DashMap::new(),
            pending: Mutex::new(HashMap::new()),
            active: RwLock::new(None),
            next_generation: AtomicU64::new(1),
        }
    }

    /// The currently active generation, if any build has been published
    pub fn active_generation(&self) -> Option<GenerationId> {
        self.active.read().as_ref().map(|(id, _)| *id)
    }

    /// Number of stored records
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Number of generations open for writing but not yet published
    pub fn pending_generation_count(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn put_record(&self, record: GameRecord) -> Result<()> {
        self.records.insert(record.id().clone(), record);
        Ok(())
    }

    fn get_record(&self, id: &RecordId) -> Result<Option<GameRecord>> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    fn scan_records(&self) -> Result<Vec<GameRecord>> {
        let mut records: Vec<GameRecord> =
            self.records.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(records)
    }
}

impl PostingStore for MemoryStore {
    fn begin_generation(&self) -> Result<GenerationId> {
        let generation = GenerationId::new(self.next_generation.fetch_add(1, Ordering::SeqCst));
        self.pending.lock().insert(generation, Postings::new());
        Ok(generation)
    }

    fn put_postings(&self, generation: GenerationId, term: &str, ids: &[RecordId]) -> Result<()> {
        let mut pending = self.pending.lock();
        let postings = pending
            .get_mut(&generation)
            .ok_or(Error::UnknownGeneration(generation))?;
        postings.insert(term.to_string(), ids.to_vec());
        Ok(())
    }

    fn swap_active_generation(&self, generation: GenerationId) -> Result<()> {
        let (postings, reclaimed) = {
            let mut pending = self.pending.lock();
            let postings = pending
                .remove(&generation)
                .ok_or(Error::UnknownGeneration(generation))?;
            // Older pending generations belong to abandoned builds; drop
            // them so a failed build cannot pin memory forever.
            let before = pending.len();
            pending.retain(|id, _| *id > generation);
            (postings, before - pending.len())
        };
        let mut active = self.active.write();
        let previous = active.as_ref().map(|(id, _)| *id);
        *active = Some((generation, Arc::new(postings)));
        debug!(?previous, active = %generation, reclaimed, "posting generation swapped");
        Ok(())
    }

    fn find_terms_containing(&self, needle: &str) -> Result<Vec<(String, Vec<RecordId>)>> {
        let snapshot = match self.active.read().as_ref() {
            Some((_, postings)) => Arc::clone(postings),
            None => return Ok(Vec::new()),
        };
        let matcher = TermMatcher::new(needle);
        Ok(snapshot
            .iter()
            .filter(|(term, _)| matcher.matches(term))
            .map(|(term, ids)| (term.clone(), ids.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: usize, moves: &str) -> GameRecord {
        GameRecord::new(
            RecordId::new("m.pgn", line),
            vec![("White".to_string(), "A".to_string())],
            moves.to_string(),
        )
    }

    fn publish(store: &MemoryStore, entries: &[(&str, Vec<RecordId>)]) -> GenerationId {
        let generation = store.begin_generation().unwrap();
        for (term, ids) in entries {
            store.put_postings(generation, term, ids).unwrap();
        }
        store.swap_active_generation(generation).unwrap();
        generation
    }

    #[test]
    fn test_record_round_trip() {
        let store = MemoryStore::new();
        let original = record(3, "1. e4 e5");
        store.put_record(original.clone()).unwrap();

        let fetched = store.get_record(original.id()).unwrap().unwrap();
        assert_eq!(fetched, original);
        assert!(store
            .get_record(&RecordId::new("m.pgn", 99))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_scan_returns_all_records_in_id_order() {
        let store = MemoryStore::new();
        store.put_record(record(10, "1. d4")).unwrap();
        store.put_record(record(2, "1. e4")).unwrap();

        let records = store.scan_records().unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id().as_str()).collect();
        // Lexicographic on the ID string: "m.pgn:10" < "m.pgn:2".
        assert_eq!(ids, vec!["m.pgn:10", "m.pgn:2"]);
    }

    #[test]
    fn test_no_active_generation_matches_nothing() {
        let store = MemoryStore::new();
        assert!(store.find_terms_containing("e4").unwrap().is_empty());
        assert!(store.active_generation().is_none());
    }

    #[test]
    fn test_find_terms_is_case_insensitive_substring() {
        let store = MemoryStore::new();
        let ids = vec![RecordId::new("m.pgn", 1)];
        publish(
            &store,
            &[
                ("White:Carlsen", ids.clone()),
                ("e4:e5:Nf3:Nc6:Bb5:a6", ids.clone()),
                ("d4:d5:c4:e6:Nc3:Nf6", ids),
            ],
        );

        let hits = store.find_terms_containing("white:carlsen").unwrap();
        assert_eq!(hits.len(), 1);

        let hits = store.find_terms_containing("NF3").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "e4:e5:Nf3:Nc6:Bb5:a6");

        assert!(store.find_terms_containing("g6").unwrap().is_empty());
    }

    #[test]
    fn test_results_come_back_in_term_order() {
        let store = MemoryStore::new();
        let ids = vec![RecordId::new("m.pgn", 1)];
        publish(
            &store,
            &[("b:term", ids.clone()), ("a:term", ids.clone()), ("c:term", ids)],
        );

        let terms: Vec<String> = store
            .find_terms_containing("term")
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(terms, vec!["a:term", "b:term", "c:term"]);
    }

    #[test]
    fn test_swap_replaces_prior_generation() {
        let store = MemoryStore::new();
        let ids = vec![RecordId::new("m.pgn", 1)];
        let first = publish(&store, &[("old:term", ids.clone())]);
        let second = publish(&store, &[("new:term", ids)]);

        assert_ne!(first, second);
        assert_eq!(store.active_generation(), Some(second));
        assert!(store.find_terms_containing("old").unwrap().is_empty());
        assert_eq!(store.find_terms_containing("new").unwrap().len(), 1);
    }

    #[test]
    fn test_write_to_unknown_generation_fails() {
        let store = MemoryStore::new();
        let bogus = GenerationId::new(777);
        let err = store
            .put_postings(bogus, "t", &[RecordId::new("m.pgn", 1)])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownGeneration(_)));
        assert!(store.swap_active_generation(bogus).is_err());
    }

    #[test]
    fn test_swap_reclaims_abandoned_pending_generations() {
        let store = MemoryStore::new();
        let ids = vec![RecordId::new("m.pgn", 1)];

        // An aborted build leaves its generation behind without swapping.
        let abandoned = store.begin_generation().unwrap();
        store.put_postings(abandoned, "t", &ids).unwrap();
        assert_eq!(store.pending_generation_count(), 1);

        // The next successful swap drops it along with publishing its own.
        publish(&store, &[("fresh:term", ids.clone())]);
        assert_eq!(store.pending_generation_count(), 0);

        // The abandoned generation is gone, not just inactive.
        let err = store
            .put_postings(abandoned, "late", &ids)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownGeneration(_)));
        assert!(store.swap_active_generation(abandoned).is_err());
    }

    #[test]
    fn test_write_to_retired_generation_fails() {
        let store = MemoryStore::new();
        let generation = publish(&store, &[("t", vec![RecordId::new("m.pgn", 1)])]);
        // Once swapped active the generation is immutable.
        let err = store
            .put_postings(generation, "late", &[RecordId::new("m.pgn", 2)])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownGeneration(_)));
    }
}
