//! Redis-backed sorted-set store
//!
//! One multiplexed `ConnectionManager` is opened lazily on first use and
//! shared by every caller afterwards; it reconnects on its own when the
//! server drops the connection. Opening it makes a single attempt bounded
//! by `connect_timeout`, so a probe or query against a down server fails
//! fast instead of sitting in the client's retry loop. Each call is bounded
//! by `call_timeout`.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, RedisResult};
use tokio::sync::OnceCell;

use crate::error::StoreError;
use crate::store::traits::{SetAddition, SortedSetStore, INDEX_SCORE};

pub struct RedisStore {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
    connect_timeout: Duration,
    call_timeout: Duration,
}

impl RedisStore {
    /// Create a store for `address` without connecting yet
    pub fn open(
        address: &str,
        connect_timeout: Duration,
        call_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = redis::Client::open(address)?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
            connect_timeout,
            call_timeout,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        let manager = self
            .connection
            .get_or_try_init(|| {
                let config = ConnectionManagerConfig::new()
                    .set_number_of_retries(0)
                    .set_connection_timeout(self.connect_timeout)
                    .set_response_timeout(self.call_timeout);
                with_timeout(
                    self.connect_timeout,
                    ConnectionManager::new_with_config(self.client.clone(), config),
                )
            })
            .await?;
        Ok(manager.clone())
    }
}

async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = RedisResult<T>>,
{
    let result = tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| StoreError::Timeout(limit))?;
    Ok(result?)
}

#[async_trait]
impl SortedSetStore for RedisStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _pong: String =
            with_timeout(self.call_timeout, redis::cmd("PING").query_async(&mut conn)).await?;
        Ok(())
    }

    async fn add_batch(&self, batch: &[SetAddition]) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        // MULTI/EXEC so the batch lands all-or-nothing
        let mut pipe = redis::pipe();
        pipe.atomic();
        for addition in batch {
            pipe.zadd(&addition.key, &addition.member, INDEX_SCORE)
                .ignore();
        }

        let mut conn = self.connection().await?;
        let _: () = with_timeout(self.call_timeout, pipe.query_async(&mut conn)).await?;
        Ok(())
    }

    async fn range_by_rank(
        &self,
        key: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<String>, StoreError> {
        let mut conn = self.connection().await?;
        let members: Vec<String> = with_timeout(
            self.call_timeout,
            conn.zrange(key, start as isize, stop as isize),
        )
        .await?;
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Instant;

    // Port 1 is reserved and refuses connections
    const REFUSED: &str = "redis://127.0.0.1:1";

    fn open(address: &str) -> Result<RedisStore, StoreError> {
        RedisStore::open(address, Duration::from_millis(500), Duration::from_secs(30))
    }

    #[test]
    fn test_open_rejects_bad_url() {
        assert!(open("not-a-redis-url").is_err());
    }

    #[test]
    fn test_open_does_not_connect() {
        let store = open(REFUSED).unwrap();
        assert!(store.connection.get().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_within_poll_interval() {
        let store = open(REFUSED).unwrap();

        for _ in 0..2 {
            let started = Instant::now();
            assert!(store.ping().await.is_err());
            // One attempt, no hidden backoff, well under the 30s call timeout
            assert!(started.elapsed() < Duration::from_secs(1));
        }
        assert!(store.connection.get().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_query_fast() {
        let store = open(REFUSED).unwrap();
        let started = Instant::now();
        assert!(store.range_by_rank("red", 0, 10).await.is_err());
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
