//! Index construction for GameFinder
//!
//! This crate derives index terms from parsed records and runs the
//! emit/group/reduce pipeline that turns (term, record ID) pairs into
//! deduplicated, sorted posting lists:
//!
//! - `tokens`: MoveToken extraction (move-number markers stripped)
//! - `terms`: field terms and 6-ply sliding-window sequence terms
//! - `builder`: the parallel build pipeline and generation publication

#![warn(clippy::all)]

pub mod builder;
pub mod terms;
pub mod tokens;

pub use builder::{BuildReport, IndexBuilder};
pub use terms::{generate_terms, MOVES_FIELD, SEQUENCE_WINDOW};
pub use tokens::move_tokens;
