//! Term generation for one record
//!
//! Two term families are emitted for every record:
//!
//! - *field terms* `"<Name>:<Value>"`, one per metadata field plus one for
//!   the verbatim move text under the literal `Moves` name;
//! - *sequence terms* `"<ply1>:...:<ply6>"`, one per contiguous window of
//!   exactly six MoveTokens (stride 1, overlapping).
//!
//! Generation is deterministic: the same record always yields the same
//! pairs, which the query side relies on when re-deriving terms.

use gamefinder_core::{GameRecord, RecordId, Result};

use crate::tokens::{move_tokens, strip_move_numbers};

/// Field name the raw move text is indexed under
pub const MOVES_FIELD: &str = "Moves";

/// Number of plies in one sequence term; fixed, not configurable
pub const SEQUENCE_WINDOW: usize = 6;

/// Derive all (term, record ID) pairs for one record
///
/// Emission order is irrelevant; deduplication happens in the builder's
/// reduce step. For `m` MoveTokens exactly `max(0, m - 5)` sequence terms
/// are emitted. Field terms and the `Moves:` term are emitted for every
/// record, move text or not; a header-only record is still findable by
/// its metadata.
///
/// # Errors
///
/// The current generator is total; the `Result` is the seam the builder's
/// lenient skip policy hangs on for records a future generation step
/// cannot handle.
pub fn generate_terms(record: &GameRecord) -> Result<Vec<(String, RecordId)>> {
    let id = record.id();
    let mut pairs = Vec::new();

    for (name, value) in record.fields() {
        pairs.push((format!("{name}:{value}"), id.clone()));
    }
    pairs.push((format!("{MOVES_FIELD}:{}", record.moves()), id.clone()));

    let tokens = move_tokens(record.moves());
    for window in tokens.windows(SEQUENCE_WINDOW) {
        let term = window
            .iter()
            .map(|t| strip_move_numbers(t))
            .collect::<Vec<_>>()
            .join(":");
        pairs.push((term, id.clone()));
    }

    Ok(pairs)
}
