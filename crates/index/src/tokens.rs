//! MoveToken extraction from raw move text
//!
//! The MoveToken sequence is derived, never stored: move-number markers
//! ("one or more digits, a period, optional trailing whitespace") are
//! removed, the remainder is split on whitespace, and empty tokens are
//! dropped. Token order equals play order.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a move-number marker such as `1.`, `23. ` or `7.   `
static MOVE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.\s*").expect("valid regex"));

/// Extract the ordered ply tokens from raw move text
pub fn move_tokens(moves: &str) -> Vec<String> {
    let stripped = MOVE_NUMBER.replace_all(moves, "");
    stripped.split_whitespace().map(str::to_string).collect()
}

/// Remove any residual move-number marker inside a single token
///
/// Defensive normalization applied when sequence terms are joined.
pub(crate) fn strip_move_numbers(token: &str) -> String {
    MOVE_NUMBER.replace_all(token, "").into_owned()
}
