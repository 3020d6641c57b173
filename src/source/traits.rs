//! Core traits and types for catalog sources

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Deserialize;

use crate::error::{FetchError, SourceError};

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceDocument {
    /// Package name, taken from the row `id`
    #[serde(rename = "id")]
    pub name: String,
}

/// Lazy sequence of catalog entries for one build pass
///
/// `SourceError::Malformed` items are recoverable; a `SourceError::Fetch`
/// item ends the stream.
pub type DocumentStream = BoxStream<'static, Result<SourceDocument, SourceError>>;

/// A catalog snapshot that can be read from the start on every call
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Start reading a fresh snapshot
    ///
    /// Fails up front when the snapshot cannot be opened at all.
    async fn fetch(&self) -> Result<DocumentStream, FetchError>;
}
