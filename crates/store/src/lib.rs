//! In-memory reference store for GameFinder
//!
//! Implements the `RecordStore` and `PostingStore` contracts from
//! `gamefinder-core` with plain in-process data structures. A durable
//! document or key-value store slots in behind the same traits.

#![warn(clippy::all)]

pub mod memory;

pub use memory::MemoryStore;
