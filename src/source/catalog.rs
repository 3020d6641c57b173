//! HTTP catalog snapshot source
//!
//! Streams the registry's `_all_docs` listing and decodes it row by row as
//! the body arrives.

use async_trait::async_trait;
use futures::TryStreamExt;

use crate::config::CatalogConfig;
use crate::error::FetchError;
use crate::source::lines::documents;
use crate::source::traits::{DocumentSource, DocumentStream};

pub struct HttpCatalogSource {
    url: String,
    http_client: reqwest::Client,
}

impl HttpCatalogSource {
    pub fn new(config: &CatalogConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            // Covers the whole streamed body, not just the headers
            .timeout(config.fetch_timeout())
            .build()?;

        Ok(Self {
            url: config.url.clone(),
            http_client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DocumentSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<DocumentStream, FetchError> {
        tracing::info!(url = %self.url, "Fetching catalog snapshot");

        let response = self.http_client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let chunks = response.bytes_stream().map_err(FetchError::Transport);
        Ok(documents(Box::pin(chunks)))
    }
}

/// Source serving a fixed snapshot body through the same decoding path
///
/// Useful for seeding a local index and for tests.
pub struct StaticCatalog {
    body: String,
}

impl StaticCatalog {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Build a well-formed snapshot listing `names`
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows: Vec<String> = names
            .into_iter()
            .map(|name| serde_json::json!({ "id": name.as_ref(), "key": name.as_ref() }).to_string())
            .collect();
        let mut body = format!("{{\"total_rows\":{},\"offset\":0,\"rows\":[\n", rows.len());
        for (i, row) in rows.iter().enumerate() {
            body.push_str(row);
            body.push_str(if i + 1 < rows.len() { ",\n" } else { "\n" });
        }
        body.push_str("]}\n");
        Self::new(body)
    }
}

#[async_trait]
impl DocumentSource for StaticCatalog {
    async fn fetch(&self) -> Result<DocumentStream, FetchError> {
        let chunk: Result<Vec<u8>, FetchError> = Ok(self.body.clone().into_bytes());
        Ok(documents(futures::stream::iter(vec![chunk])))
    }
}
