//! Core traits and types for the sorted-set store abstraction
//!
//! This module defines the `SortedSetStore` trait that allows different
//! store implementations (Redis, in-process) to back the index
//! interchangeably.

use async_trait::async_trait;

use crate::error::StoreError;

/// Score given to every indexed member
///
/// With equal scores the store orders members lexicographically, which is
/// the only ranking the index relies on.
pub const INDEX_SCORE: f64 = 0.0;

/// A single queued sorted-set addition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetAddition {
    /// Sorted set the member is added to (the prefix)
    pub key: String,
    /// Member added with `INDEX_SCORE` (the full name)
    pub member: String,
}

impl SetAddition {
    pub fn new(key: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            member: member.into(),
        }
    }
}

/// Sorted-set store capability used by the index builder and query service
///
/// Members of a set are ordered by score, then by member bytes. Ranks are
/// zero-based and `stop` is inclusive, matching Redis `ZRANGE`.
#[async_trait]
pub trait SortedSetStore: Send + Sync {
    /// Check that the store is reachable
    async fn ping(&self) -> Result<(), StoreError>;

    /// Apply a batch of additions atomically
    ///
    /// Either every addition lands or none does. Adding a member that is
    /// already present leaves the set unchanged.
    async fn add_batch(&self, batch: &[SetAddition]) -> Result<(), StoreError>;

    /// Read members of `key` ranked `start..=stop`
    ///
    /// A missing key reads as an empty set.
    async fn range_by_rank(
        &self,
        key: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<String>, StoreError>;
}
