//! Core types and traits for GameFinder
//!
//! This crate defines the foundational types used throughout the system:
//! - RecordId: Unique identifier for parsed games (`source:line`)
//! - GameRecord: One parsed game (ordered metadata fields + raw move text)
//! - GenerationId: Identifier for one immutable posting-list snapshot
//! - Error: Error type hierarchy
//! - Traits: Store contracts (RecordStore, PostingStore)
//! - TermMatcher: The substring matching primitive used for term lookup

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod matcher;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use matcher::TermMatcher;
pub use traits::{PostingStore, RecordStore};
pub use types::{GameRecord, GenerationId, RecordId};
