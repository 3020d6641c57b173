//! In-process sorted-set store
//!
//! Every member is stored with `INDEX_SCORE`, so a set is a plain
//! `BTreeSet<String>` and rank order is byte-wise member order, the same
//! order Redis gives equal-score members.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::traits::{SetAddition, SortedSetStore};

#[derive(Default)]
pub struct MemoryStore {
    sets: RwLock<HashMap<String, BTreeSet<String>>>,
    batches_applied: AtomicUsize,
    /// When set, every call fails as if the store were unreachable
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated unavailability
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of batches successfully applied so far
    pub fn batches_applied(&self) -> usize {
        self.batches_applied.load(Ordering::SeqCst)
    }

    /// Whether a set exists under `key`
    pub async fn contains_key(&self, key: &str) -> bool {
        self.sets.read().await.contains_key(key)
    }

    /// All members of `key` in rank order
    pub async fn members(&self, key: &str) -> Vec<String> {
        self.sets
            .read()
            .await
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of sets in the store
    pub async fn key_count(&self) -> usize {
        self.sets.read().await.len()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SortedSetStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_online()
    }

    async fn add_batch(&self, batch: &[SetAddition]) -> Result<(), StoreError> {
        self.check_online()?;

        // Single write guard for the whole batch keeps it atomic to readers
        let mut sets = self.sets.write().await;
        for addition in batch {
            sets.entry(addition.key.clone())
                .or_default()
                .insert(addition.member.clone());
        }
        self.batches_applied.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn range_by_rank(
        &self,
        key: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<String>, StoreError> {
        self.check_online()?;

        if stop < start {
            return Ok(Vec::new());
        }
        let sets = self.sets.read().await;
        Ok(sets
            .get(key)
            .map(|set| {
                set.iter()
                    .skip(start)
                    .take(stop - start + 1)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
