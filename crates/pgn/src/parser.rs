//! Parsing one PGN game block into a structured record
//!
//! A block is a run of bracketed tag lines (`[Name Value]`, value may
//! contain spaces and is usually double-quoted) followed by free-form move
//! text. Everything after the last closing bracket, trimmed and with
//! embedded newlines removed, is the raw move text.

use gamefinder_core::{Error, GameRecord, RecordId, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::splitter::{split_games, RawGame};

/// Matches one bracketed metadata tag, capturing its inner content
static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]").expect("valid regex"));

/// Parse one game block into a [`GameRecord`]
///
/// `source_id` and `start_line` locate the block for error reporting; they
/// are the same values the block's [`RecordId`] was built from.
///
/// # Errors
///
/// Returns [`Error::MalformedRecord`] if the block contains no bracketed
/// tag, or a tag cannot be split into a name and a value.
pub fn parse_game(
    id: RecordId,
    source_id: &str,
    start_line: usize,
    raw: &str,
) -> Result<GameRecord> {
    let malformed = |reason: String| Error::MalformedRecord {
        source_id: source_id.to_string(),
        line: start_line,
        reason,
    };

    let mut fields = Vec::new();
    for caps in TAG_PATTERN.captures_iter(raw) {
        let inner = caps.get(1).expect("capture group 1").as_str();
        let (name, value) = inner
            .split_once(' ')
            .ok_or_else(|| malformed(format!("tag [{inner}] has no value")))?;
        let value = value.trim().trim_matches('"');
        fields.push((name.to_string(), value.to_string()));
    }

    if fields.is_empty() {
        return Err(malformed("no bracketed tag found".to_string()));
    }

    // Everything after the last closing bracket is move text.
    let tail_start = raw.rfind(']').map(|i| i + 1).unwrap_or(raw.len());
    let moves = raw[tail_start..].trim().replace('\n', "");

    Ok(GameRecord::new(id, fields, moves))
}

/// Split a source file and parse every game block in it
///
/// # Errors
///
/// Returns [`Error::MalformedRecord`] if the source has no game-start tag
/// or any block in it fails to parse. A failure here covers the whole
/// source; callers ingesting many files report it and move on to the next
/// file.
pub fn parse_source(source_name: &str, contents: &str) -> Result<Vec<GameRecord>> {
    split_games(source_name, contents)?
        .into_iter()
        .map(|RawGame { id, start_line, text }| parse_game(id, source_name, start_line, &text))
        .collect()
}
