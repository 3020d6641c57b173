//! Sorted-set store backends
//!
//! The index and the query service only see `SortedSetStore`. One store
//! handle is created at startup and shared by everything through `Arc`.

mod memory;
mod redis_store;
mod traits;

use std::sync::Arc;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use traits::{SetAddition, SortedSetStore, INDEX_SCORE};

use crate::config::{StoreBackend, StoreConfig};
use crate::error::StoreError;

/// Create the shared store handle for the configured backend
///
/// No connection is made here; the readiness gate does the first round-trip.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn SortedSetStore>, StoreError> {
    match config.backend {
        StoreBackend::Redis => {
            tracing::info!(address = %config.address, "Using Redis sorted-set store");
            let store = RedisStore::open(
                &config.address,
                config.connect_timeout(),
                config.call_timeout(),
            )?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::info!("Using in-process sorted-set store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
