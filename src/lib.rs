//! Names Search - prefix autocomplete over a package-name catalog
//!
//! The service keeps one sorted set per name prefix. A background refresh
//! loop rebuilds the sets from a full catalog snapshot at startup and then
//! every 12 hours; the HTTP layer answers `GET /v1/<prefix>` by reading the
//! first ranks of the matching set.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Consumers: editor completion providers, CLI tools              │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    HTTP Service (axum)                          │
//! │                  PrefixQueryService                             │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   Sorted-Set Store                              │
//! │          prefix -> {name, ...} (Redis or in-process)            │
//! └─────────────────────────────────────────────────────────────────┘
//!                               ▲
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Refresh Pipeline                               │
//! │     catalog snapshot -> expand -> BatchedIndexWriter            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use names_search::{ServiceConfig, RefreshPipeline, HttpCatalogSource};
//!
//! let config = ServiceConfig::load()?;
//! let store = names_search::store::open_store(&config.store)?;
//! let source = Arc::new(HttpCatalogSource::new(&config.catalog)?);
//!
//! let pipeline = RefreshPipeline::new(source, store.clone(), config.index.batch_size, status);
//! pipeline.build().await?;
//!
//! let service = PrefixQueryService::new(store, &config.query);
//! let suggestions = service.query("red").await?;
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod query;
pub mod refresh;
pub mod server;
pub mod source;
pub mod store;

// Re-export main types
pub use config::{ServiceConfig, StoreBackend};
pub use error::{
    BuildError, ConfigError, FetchError, FlushError, MalformedRecordError, QueryStoreError,
    SourceError, StoreError, StoreUnavailableError,
};
pub use index::{expand, BatchedIndexWriter, PrefixPair};
pub use query::{PrefixQueryService, Suggestions, MAX_SUGGESTIONS};
pub use refresh::{run_refresh_loop, BuildReport, IndexStatus, RefreshPipeline, RefreshSchedule};
pub use server::{build_router, AppState};
pub use source::{DocumentSource, HttpCatalogSource, SourceDocument, StaticCatalog};
pub use store::{MemoryStore, RedisStore, SortedSetStore};
