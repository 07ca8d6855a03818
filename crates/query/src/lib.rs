//! Boolean query evaluation for GameFinder
//!
//! Splits a query into whitespace-delimited terms, matches each against the
//! index by case-insensitive substring, unions postings per query term, and
//! intersects across terms (boolean AND). Surviving record IDs are resolved
//! to full records through the record store.

#![warn(clippy::all)]

pub mod evaluator;

pub use evaluator::QueryEvaluator;
