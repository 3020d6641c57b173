//! Build reporting shared between the builder and the HTTP layer

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

/// Summary of one completed build
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BuildReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Records read from the catalog
    pub documents: u64,
    pub indexed_names: u64,
    /// Names too short to index
    pub skipped_short_names: u64,
    pub malformed_records: u64,
    pub pairs_written: u64,
    pub batches_flushed: u64,
}

/// Latest successful build, readable from request handlers
#[derive(Clone, Default)]
pub struct IndexStatus {
    last_build: Arc<RwLock<Option<BuildReport>>>,
}

impl IndexStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn last_build(&self) -> Option<BuildReport> {
        self.last_build.read().await.clone()
    }

    pub async fn record(&self, report: BuildReport) {
        *self.last_build.write().await = Some(report);
    }
}
