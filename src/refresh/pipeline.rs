//! One full index build: catalog → prefixes → store

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;

use crate::error::{BuildError, SourceError};
use crate::index::{expand, BatchedIndexWriter};
use crate::refresh::status::{BuildReport, IndexStatus};
use crate::source::DocumentSource;
use crate::store::SortedSetStore;

/// Runs full rebuilds of the prefix index
pub struct RefreshPipeline {
    source: Arc<dyn DocumentSource>,
    store: Arc<dyn SortedSetStore>,
    batch_size: usize,
    status: IndexStatus,
}

impl RefreshPipeline {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        store: Arc<dyn SortedSetStore>,
        batch_size: usize,
        status: IndexStatus,
    ) -> Self {
        Self {
            source,
            store,
            batch_size,
            status,
        }
    }

    pub fn store(&self) -> &Arc<dyn SortedSetStore> {
        &self.store
    }

    pub fn status(&self) -> &IndexStatus {
        &self.status
    }

    /// Read the whole catalog and add every prefix pair to the store
    ///
    /// Aborts on the first fetch or flush failure. Batches flushed before
    /// the failure stay in the store.
    pub async fn build(&self) -> Result<BuildReport, BuildError> {
        let started_at = Utc::now();
        tracing::info!("Started building the search index");

        let mut documents = self.source.fetch().await?;
        let mut writer = BatchedIndexWriter::new(self.store.clone(), self.batch_size);

        let mut seen = 0u64;
        let mut indexed = 0u64;
        let mut skipped_short = 0u64;
        let mut malformed = 0u64;

        while let Some(item) = documents.next().await {
            let doc = match item {
                Ok(doc) => doc,
                Err(SourceError::Malformed(e)) => {
                    tracing::error!(
                        line = %e.line,
                        error = %e.source,
                        "Skipping malformed catalog record"
                    );
                    malformed += 1;
                    continue;
                }
                Err(SourceError::Fetch(e)) => return Err(e.into()),
            };
            seen += 1;

            let pairs = expand(&doc.name);
            if pairs.is_empty() {
                skipped_short += 1;
                continue;
            }
            for pair in pairs {
                writer.add(pair.prefix, pair.name);
            }
            indexed += 1;

            writer.flush_if_needed().await?;
        }

        writer.flush_remaining().await?;
        let stats = writer.close();

        let report = BuildReport {
            started_at,
            finished_at: Utc::now(),
            documents: seen,
            indexed_names: indexed,
            skipped_short_names: skipped_short,
            malformed_records: malformed,
            pairs_written: stats.pairs_written,
            batches_flushed: stats.batches_flushed,
        };

        tracing::info!(
            documents = report.documents,
            indexed_names = report.indexed_names,
            malformed_records = report.malformed_records,
            pairs_written = report.pairs_written,
            batches_flushed = report.batches_flushed,
            "The search index is successfully built"
        );
        self.status.record(report.clone()).await;
        Ok(report)
    }
}
