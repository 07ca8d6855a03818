//! PGN record parsing for GameFinder
//!
//! This crate turns raw PGN source text into [`GameRecord`]s:
//! - `splitter`: cuts a multi-game source into per-game blocks and assigns
//!   each block its `source:line` RecordId
//! - `parser`: turns one block into a structured record (tag fields + raw
//!   move text)
//!
//! [`GameRecord`]: gamefinder_core::GameRecord

#![warn(clippy::all)]

pub mod parser;
pub mod splitter;

pub use parser::{parse_game, parse_source};
pub use splitter::{split_games, RawGame, START_TAG};
