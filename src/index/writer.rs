//! Batched writes of prefix pairs into the sorted-set store
//!
//! Pairs are queued in memory and sent to the store in batches of at most
//! `threshold` operations, bounding round-trips for catalogs with hundreds
//! of thousands of names. The writer only ever adds: members of names that
//! have left the catalog stay in the index.

use std::sync::Arc;

use crate::error::FlushError;
use crate::store::{SetAddition, SortedSetStore};

/// Counters reported when the writer is closed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub pairs_written: u64,
    pub batches_flushed: u64,
}

pub struct BatchedIndexWriter {
    store: Arc<dyn SortedSetStore>,
    pending: Vec<SetAddition>,
    threshold: usize,
    stats: WriterStats,
}

impl BatchedIndexWriter {
    pub fn new(store: Arc<dyn SortedSetStore>, threshold: usize) -> Self {
        Self {
            store,
            pending: Vec::with_capacity(threshold),
            threshold,
            stats: WriterStats::default(),
        }
    }

    /// Queue `name` for addition to the set under `prefix`
    pub fn add(&mut self, prefix: impl Into<String>, name: impl Into<String>) {
        self.pending.push(SetAddition::new(prefix, name));
    }

    /// Number of queued operations not yet flushed
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Flush if the pending count has reached the threshold
    ///
    /// Returns whether a flush happened.
    pub async fn flush_if_needed(&mut self) -> Result<bool, FlushError> {
        if self.pending.len() < self.threshold {
            return Ok(false);
        }
        self.flush().await?;
        Ok(true)
    }

    /// Flush whatever is still queued
    ///
    /// Returns whether a flush happened.
    pub async fn flush_remaining(&mut self) -> Result<bool, FlushError> {
        if self.pending.is_empty() {
            return Ok(false);
        }
        self.flush().await?;
        Ok(true)
    }

    /// Release the writer; anything still queued is discarded
    pub fn close(self) -> WriterStats {
        if !self.pending.is_empty() {
            tracing::warn!(
                discarded = self.pending.len(),
                "Index writer closed with unflushed operations"
            );
        }
        self.stats
    }

    async fn flush(&mut self) -> Result<(), FlushError> {
        // A failed batch is dropped, not retried
        let batch = std::mem::take(&mut self.pending);
        let operations = batch.len();

        self.store
            .add_batch(&batch)
            .await
            .map_err(|source| FlushError { operations, source })?;

        tracing::debug!(operations, "Flushed index batch");
        self.stats.pairs_written += operations as u64;
        self.stats.batches_flushed += 1;
        // Reuse the allocation for the next batch
        self.pending = batch;
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn new_writer(threshold: usize) -> (Arc<MemoryStore>, BatchedIndexWriter) {
        let store = Arc::new(MemoryStore::new());
        let writer = BatchedIndexWriter::new(store.clone(), threshold);
        (store, writer)
    }

    #[tokio::test]
    async fn test_exact_threshold_flushes_once() {
        let (store, mut writer) = new_writer(1000);
        for i in 0..1000 {
            writer.add(format!("pre{}", i % 7), format!("name-{i}"));
        }

        assert!(writer.flush_if_needed().await.unwrap());
        assert_eq!(writer.pending(), 0);
        assert_eq!(store.batches_applied(), 1);

        // Nothing left for the end-of-build flush
        assert!(!writer.flush_remaining().await.unwrap());
        assert_eq!(store.batches_applied(), 1);

        let stats = writer.close();
        assert_eq!(stats.pairs_written, 1000);
        assert_eq!(stats.batches_flushed, 1);
    }

    #[tokio::test]
    async fn test_below_threshold_waits() {
        let (store, mut writer) = new_writer(1000);
        writer.add("red", "redis");

        assert!(!writer.flush_if_needed().await.unwrap());
        assert_eq!(store.batches_applied(), 0);
        assert!(!store.contains_key("red").await);

        assert!(writer.flush_remaining().await.unwrap());
        assert_eq!(store.members("red").await, vec!["redis"]);
    }

    #[tokio::test]
    async fn test_duplicate_pairs_store_one_member() {
        let (store, mut writer) = new_writer(10);
        writer.add("red", "redis");
        writer.add("red", "redis");
        writer.flush_remaining().await.unwrap();
        writer.add("red", "redis");
        writer.flush_remaining().await.unwrap();

        assert_eq!(store.members("red").await, vec!["redis"]);
    }

    #[tokio::test]
    async fn test_failed_flush_drops_batch() {
        let (store, mut writer) = new_writer(2);
        writer.add("abc", "abcd");
        writer.add("abc", "abcde");
        store.set_offline(true);

        let err = writer.flush_if_needed().await.unwrap_err();
        assert_eq!(err.operations, 2);
        assert_eq!(writer.pending(), 0);

        store.set_offline(false);
        assert!(!writer.flush_remaining().await.unwrap());
        assert!(!store.contains_key("abc").await);
    }
}
