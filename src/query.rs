//! Prefix Query Service - suggestion lookup over the prefix index
//!
//! A query reads the sorted set stored under the raw prefix and returns its
//! first ranks. No normalization happens here: the prefix must match a key
//! written by the builder byte for byte, so lookups are case-sensitive.

use std::sync::Arc;
use std::time::Duration;

use crate::config::QueryConfig;
use crate::error::QueryStoreError;
use crate::store::SortedSetStore;

/// Most names a single query ever returns
pub const MAX_SUGGESTIONS: usize = 11;

/// Suggestions for one prefix plus how long they may be cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions {
    /// Names in store order (lexicographic among equal scores)
    pub names: Vec<String>,
    pub max_age: Duration,
}

impl Suggestions {
    /// Value for the `Cache-Control` response header
    pub fn cache_control(&self) -> String {
        format!("max-age={}", self.max_age.as_secs())
    }
}

/// Read side of the index, shared by all request handlers
pub struct PrefixQueryService {
    store: Arc<dyn SortedSetStore>,
    max_suggestions: usize,
    max_age: Duration,
}

impl PrefixQueryService {
    pub fn new(store: Arc<dyn SortedSetStore>, config: &QueryConfig) -> Self {
        Self {
            store,
            max_suggestions: config.max_suggestions.min(MAX_SUGGESTIONS),
            max_age: config.cache_max_age(),
        }
    }

    /// Look up suggestions for `raw_prefix`
    ///
    /// Returns ranks `0..max_suggestions`. An unknown prefix yields an empty
    /// list. Store failures are returned as-is and not retried.
    pub async fn query(&self, raw_prefix: &str) -> Result<Suggestions, QueryStoreError> {
        let names = self
            .store
            .range_by_rank(raw_prefix, 0, self.max_suggestions.saturating_sub(1))
            .await
            .map_err(|source| QueryStoreError {
                prefix: raw_prefix.to_string(),
                source,
            })?;

        Ok(Suggestions {
            names,
            max_age: self.max_age,
        })
    }
}
