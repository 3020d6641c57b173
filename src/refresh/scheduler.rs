//! Background rebuild loop
//!
//! Waits for the store, builds once immediately, then rebuilds on a fixed
//! period until shutdown is signalled. Builds run inline in the loop, so a
//! slow build delays the next tick instead of overlapping with it. Shutdown
//! abandons a build in progress.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::config::IndexConfig;
use crate::error::StoreUnavailableError;
use crate::refresh::pipeline::RefreshPipeline;
use crate::store::SortedSetStore;

/// Timing of the rebuild loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSchedule {
    pub rebuild_interval: Duration,
    pub readiness_poll_interval: Duration,
}

impl From<&IndexConfig> for RefreshSchedule {
    fn from(config: &IndexConfig) -> Self {
        Self {
            rebuild_interval: config.rebuild_interval(),
            readiness_poll_interval: config.readiness_poll_interval(),
        }
    }
}

/// Block until the store answers a ping
///
/// Polls at a fixed interval and never gives up. A slow probe pushes the
/// next one back a full interval. Returns the number of probes it took.
pub async fn wait_for_store(store: &dyn SortedSetStore, poll_interval: Duration) -> u64 {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut attempts = 0u64;

    loop {
        ticker.tick().await;
        attempts += 1;

        match store.ping().await {
            Ok(()) => {
                tracing::info!(attempts, "Store is ready");
                return attempts;
            }
            Err(e) => {
                let e = StoreUnavailableError(e);
                tracing::warn!(error = %e, attempts, "Waiting for the store to load");
            }
        }
    }
}

/// Run the rebuild loop until `shutdown` turns true or its sender is dropped
pub async fn run_refresh_loop(
    pipeline: RefreshPipeline,
    schedule: RefreshSchedule,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::select! {
        _ = wait_for_store(pipeline.store().as_ref(), schedule.readiness_poll_interval) => {}
        _ = shutdown_requested(&mut shutdown) => {
            tracing::info!("Shutdown requested before the store became ready");
            return;
        }
    }

    tracing::info!(
        interval_secs = schedule.rebuild_interval.as_secs(),
        "Starting index refresh loop"
    );

    // First tick completes immediately: that is the startup build
    let mut ticker = interval(schedule.rebuild_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown_requested(&mut shutdown) => {
                tracing::info!("Index refresh loop stopped");
                return;
            }
        }

        tokio::select! {
            result = pipeline.build() => {
                if let Err(e) = result {
                    tracing::error!(
                        error = %e,
                        "Index build failed, waiting for the next scheduled run"
                    );
                }
            }
            _ = shutdown_requested(&mut shutdown) => {
                // Batches already flushed stay in the store
                tracing::info!("Index refresh loop stopped during a build");
                return;
            }
        }
    }
}

async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    // Err means the sender is gone, which is shutdown as well
    let _ = shutdown.wait_for(|stop| *stop).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use tokio::sync::Mutex;
    use tokio::time::Instant;

    use crate::error::{FetchError, StoreError};
    use crate::refresh::IndexStatus;
    use crate::source::{DocumentSource, DocumentStream, StaticCatalog};
    use crate::store::{MemoryStore, SetAddition};

    /// Counts fetches; every other one fails
    #[derive(Default)]
    struct FlakyCatalog {
        fetches: AtomicUsize,
    }

    impl FlakyCatalog {
        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentSource for FlakyCatalog {
        async fn fetch(&self) -> Result<DocumentStream, FetchError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            if n % 2 == 0 {
                return Err(FetchError::Status(503));
            }
            StaticCatalog::from_names(["redis"]).fetch().await
        }
    }

    /// Store whose pings take three seconds; the first one fails
    #[derive(Default)]
    struct SlowStore {
        probes: Mutex<Vec<Instant>>,
    }

    #[async_trait]
    impl SortedSetStore for SlowStore {
        async fn ping(&self) -> Result<(), StoreError> {
            let first = {
                let mut probes = self.probes.lock().await;
                probes.push(Instant::now());
                probes.len() == 1
            };
            tokio::time::sleep(Duration::from_secs(3)).await;
            if first {
                return Err(StoreError::Unavailable("loading".to_string()));
            }
            Ok(())
        }

        async fn add_batch(&self, _batch: &[SetAddition]) -> Result<(), StoreError> {
            Ok(())
        }

        async fn range_by_rank(
            &self,
            _key: &str,
            _start: usize,
            _stop: usize,
        ) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    const HOUR: Duration = Duration::from_secs(3600);

    fn schedule() -> RefreshSchedule {
        RefreshSchedule {
            rebuild_interval: HOUR,
            readiness_poll_interval: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_schedule_from_config() {
        let schedule = RefreshSchedule::from(&IndexConfig::default());
        assert_eq!(schedule.rebuild_interval, Duration::from_secs(12 * 3600));
        assert_eq!(schedule.readiness_poll_interval, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_store_polls_until_ready() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);

        let waiter = tokio::spawn({
            let store = store.clone();
            async move { wait_for_store(store.as_ref(), Duration::from_secs(1)).await }
        });

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(!waiter.is_finished());

        store.set_offline(false);
        // Probes at 0s..3s failed, the one at 4s succeeds
        assert_eq!(waiter.await.unwrap(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_probe_does_not_burst() {
        let store = SlowStore::default();
        let attempts = wait_for_store(&store, Duration::from_secs(1)).await;
        assert_eq!(attempts, 2);

        let probes = store.probes.lock().await;
        // First probe ran 0s..3s; the next waits a full interval after it
        assert!(probes[1] - probes[0] >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebuilds_on_interval_despite_failures() {
        let source = Arc::new(FlakyCatalog::default());
        let store = Arc::new(MemoryStore::new());
        let pipeline =
            RefreshPipeline::new(source.clone(), store.clone(), 1000, IndexStatus::new());

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run_refresh_loop(pipeline, schedule(), rx));

        // Builds at 0h (fails), 1h (succeeds) and 2h (fails)
        tokio::time::sleep(2 * HOUR + Duration::from_secs(60)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(source.fetches(), 3);
        assert_eq!(store.members("red").await, vec!["redis"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_while_waiting_for_store() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);
        let source = Arc::new(FlakyCatalog::default());
        let pipeline = RefreshPipeline::new(source.clone(), store, 1000, IndexStatus::new());

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run_refresh_loop(pipeline, schedule(), rx));

        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(tx);
        handle.await.unwrap();

        assert_eq!(source.fetches(), 0);
    }
}
