//! Record splitting for multi-game PGN sources
//!
//! A source file holds many concatenated games. A new record begins at
//! every line that starts with the game-start tag (`[Event `); the record
//! is identified by the 1-based line number of that starting line.
//! Anything before the first start tag is preamble and is skipped.
//!
//! Policy: a source with zero start-tag lines is rejected as malformed
//! (strict mode). The caller reports the failure per file and keeps
//! ingesting other files.

use gamefinder_core::{Error, RecordId, Result};

/// Tag name that always opens a PGN game record
pub const START_TAG: &str = "[Event ";

/// One unparsed game block cut out of a source file
#[derive(Debug, Clone)]
pub struct RawGame {
    /// The `source:line` identifier assigned to this block
    pub id: RecordId,
    /// 1-based line number of the block's opening tag
    pub start_line: usize,
    /// The block's raw text, lines joined with `\n`
    pub text: String,
}

/// Split a source file's contents into per-game blocks
///
/// # Errors
///
/// Returns [`Error::MalformedRecord`] if no line starts with [`START_TAG`].
pub fn split_games(source_name: &str, contents: &str) -> Result<Vec<RawGame>> {
    let mut games = Vec::new();
    // (1-based start line, accumulated text); None while in preamble
    let mut current: Option<(usize, String)> = None;

    for (idx, line) in contents.lines().enumerate() {
        if line.starts_with(START_TAG) {
            if let Some((start_line, text)) = current.take() {
                games.push(RawGame {
                    id: RecordId::new(source_name, start_line),
                    start_line,
                    text,
                });
            }
            current = Some((idx + 1, String::new()));
        }
        if let Some((_, text)) = current.as_mut() {
            text.push_str(line);
            text.push('\n');
        }
    }

    if let Some((start_line, text)) = current {
        games.push(RawGame {
            id: RecordId::new(source_name, start_line),
            start_line,
            text,
        });
    }

    if games.is_empty() {
        return Err(Error::MalformedRecord {
            source_id: source_name.to_string(),
            line: 1,
            reason: format!("no game-start tag ({START_TAG:?}) found"),
        });
    }

    Ok(games)
}
