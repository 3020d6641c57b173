//! Prefix index construction
//!
//! `expand` turns a name into its prefix keys and `BatchedIndexWriter`
//! streams the resulting pairs into the sorted-set store.

mod expander;
mod writer;

pub use expander::{expand, PrefixPair, MAX_UNINDEXED_CHARS, MIN_PREFIX_CHARS};
pub use writer::{BatchedIndexWriter, WriterStats};
