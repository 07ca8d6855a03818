//! The boolean AND-of-ORs query evaluator
//!
//! Per query term the evaluator unions the posting lists of every index
//! term containing it (deduplicated, first-seen order). Across query terms
//! it intersects those unions, keeping the first union's insertion order,
//! which makes the final record order stable. Evaluation is read-only: it
//! only ever sees the store's active posting generation.

use std::collections::HashSet;

use gamefinder_core::{Error, GameRecord, PostingStore, RecordId, RecordStore, Result};
use tracing::warn;

/// Evaluates multi-term boolean queries against the active index
pub struct QueryEvaluator<'a> {
    postings: &'a dyn PostingStore,
    records: &'a dyn RecordStore,
}

impl<'a> QueryEvaluator<'a> {
    /// Create an evaluator over the given store handles
    pub fn new(postings: &'a dyn PostingStore, records: &'a dyn RecordStore) -> Self {
        QueryEvaluator { postings, records }
    }

    /// Evaluate `text` and resolve the matching records
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQuery`] if `text` holds no terms, or a store
    /// error if lookup or resolution fails. Query failures never touch the
    /// index.
    pub fn query(&self, text: &str) -> Result<Vec<GameRecord>> {
        let query_terms: Vec<&str> = text.split_whitespace().collect();
        if query_terms.is_empty() {
            return Err(Error::EmptyQuery);
        }

        // AND across query terms; intersection keeps the first term's
        // first-seen posting order. Duplicate query terms are harmless,
        // intersection is idempotent.
        let mut common: Option<Vec<RecordId>> = None;
        for query_term in query_terms {
            let ids = self.matching_ids(query_term)?;
            common = Some(match common {
                None => ids,
                Some(previous) => {
                    let keep: HashSet<RecordId> = ids.into_iter().collect();
                    previous.into_iter().filter(|id| keep.contains(id)).collect()
                }
            });
            if common.as_ref().is_some_and(Vec::is_empty) {
                return Ok(Vec::new());
            }
        }

        let mut results = Vec::new();
        for id in common.unwrap_or_default() {
            match self.records.get_record(&id)? {
                Some(record) => results.push(record),
                // The index can briefly reference records a re-ingest
                // removed; surface it but keep answering.
                None => warn!(record = %id, "posting references an unknown record"),
            }
        }
        Ok(results)
    }

    /// OR within one query term: union of postings over all index terms
    /// containing it, deduplicated, first-seen order preserved
    fn matching_ids(&self, query_term: &str) -> Result<Vec<RecordId>> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for (_, posting) in self.postings.find_terms_containing(query_term)? {
            for id in posting {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }
}
