//! Error taxonomy for the index builder and the query service
//!
//! Record-level errors are recoverable and only logged. Build-level errors
//! abort the current build cycle. Query-level errors are reported to the
//! HTTP caller. Nothing here is fatal to the process.

use std::time::Duration;

use thiserror::Error;

/// Low-level failure talking to the sorted-set store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// The catalog snapshot could not be fetched or read
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Catalog responded with status {0}")]
    Status(u16),
    #[error("Catalog stream failed: {0}")]
    Stream(String),
}

/// One catalog line could not be parsed into a document
#[derive(Debug, Error)]
#[error("Malformed catalog record {line:?}: {source}")]
pub struct MalformedRecordError {
    pub line: String,
    #[source]
    pub source: serde_json::Error,
}

/// An item of the document stream that is not a document
#[derive(Debug, Error)]
pub enum SourceError {
    /// Aborts the stream
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Skip and keep reading
    #[error(transparent)]
    Malformed(#[from] MalformedRecordError),
}

/// A write batch did not land in the store
#[derive(Debug, Error)]
#[error("Failed to flush batch of {operations} index operations: {source}")]
pub struct FlushError {
    pub operations: usize,
    #[source]
    pub source: StoreError,
}

/// Aborts one build; the scheduler keeps running
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Flush(#[from] FlushError),
}

/// The store did not answer the readiness probe
#[derive(Debug, Error)]
#[error("Store unavailable: {0}")]
pub struct StoreUnavailableError(#[from] pub StoreError);

/// Reading suggestions for a prefix failed
#[derive(Debug, Error)]
#[error("Failed to read suggestions for prefix {prefix:?}: {source}")]
pub struct QueryStoreError {
    pub prefix: String,
    #[source]
    pub source: StoreError,
}

/// Invalid or unreadable configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
