//! tutor-text
//!
//! Tantivy-backed keyword search over passages. The index lives entirely in
//! memory and is rebuilt each process start from the embedding store's
//! exported text; it is never persisted on its own.

pub mod analyzer;
pub mod index;

pub use index::LexicalIndex;
