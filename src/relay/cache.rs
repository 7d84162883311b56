use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::relay::fetcher::VersionFetcher;
use crate::relay::record::VersionRecord;
use crate::relay::store::{MemoryStore, RecordStore};

/// A fetch shared by every caller that asked for the same URL while it ran
type InflightFetch = Shared<BoxFuture<'static, VersionRecord>>;

type InflightTable = HashMap<String, InflightFetch>;

/// Point-in-time view of the cache, exposed by the metrics endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub stale_entries: usize,
    pub in_flight: usize,
}

/// Trait for resolving the current record of an upstream URL
#[async_trait::async_trait]
pub trait VersionLookup: Send + Sync + 'static {
    /// Returns the cached record for `url`, fetching it when missing or stale
    async fn get_or_lookup(&self, url: &str) -> VersionRecord;

    fn stats(&self) -> CacheStats;
}

/// Time-limited cache of upstream version records with per-URL single-flight
///
/// Lock order is always `inflight` then `store`; neither is held across an
/// `.await`.
pub struct VersionCache<F: VersionFetcher, S: RecordStore = MemoryStore> {
    fetcher: Arc<F>,
    store: Arc<Mutex<S>>,
    inflight: Arc<Mutex<InflightTable>>,
    freshness: Duration,
}

impl<F: VersionFetcher> VersionCache<F> {
    pub fn new(fetcher: F, freshness: Duration) -> Self {
        Self::with_store(fetcher, MemoryStore::new(), freshness)
    }
}

impl<F: VersionFetcher, S: RecordStore> VersionCache<F, S> {
    pub fn with_store(fetcher: F, store: S, freshness: Duration) -> Self {
        info!(
            "Initializing version cache with freshness of {:?}",
            freshness
        );

        Self {
            fetcher: Arc::new(fetcher),
            store: Arc::new(Mutex::new(store)),
            inflight: Arc::new(Mutex::new(HashMap::new())),
            freshness,
        }
    }

    pub async fn get_or_lookup(&self, url: &str) -> VersionRecord {
        let fetch = {
            let mut inflight = lock(&self.inflight);

            let cached = lock(&self.store)
                .get(url)
                .filter(|record| record.is_fresh(Instant::now(), self.freshness));
            if let Some(record) = cached {
                debug!("Cache hit for {}", url);
                return record;
            }

            match inflight.get(url) {
                Some(fetch) => {
                    debug!("Joining in-flight fetch for {}", url);
                    fetch.clone()
                }
                None => {
                    let fetch = self.spawn_fetch(url);
                    inflight.insert(url.to_string(), fetch.clone());
                    fetch
                }
            }
        };

        fetch.await
    }

    pub fn stats(&self) -> CacheStats {
        let inflight = lock(&self.inflight);
        let store = lock(&self.store);

        CacheStats {
            entries: store.record_count(),
            stale_entries: store.stale_urls(Instant::now(), self.freshness).len(),
            in_flight: inflight.len(),
        }
    }

    /// Starts the fetch for `url` on its own task
    ///
    /// Must be called with the in-flight table locked: the task takes that
    /// lock to publish its record, so it cannot unregister itself before the
    /// caller has registered it.
    fn spawn_fetch(&self, url: &str) -> InflightFetch {
        let fetcher = Arc::clone(&self.fetcher);
        let store = Arc::clone(&self.store);
        let inflight = Arc::clone(&self.inflight);
        let url = url.to_string();

        info!("Fetching version document for {}", url);

        let task = tokio::spawn(async move {
            let record = AssertUnwindSafe(fetcher.fetch(&url))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    error!("Version fetcher panicked for {}", url);
                    VersionRecord::local_failure()
                });

            let mut inflight = lock(&inflight);
            lock(&store).put(&url, record.clone());
            inflight.remove(&url);

            debug!(
                "Stored record for {} with status {}",
                url, record.status_code
            );
            record
        });

        task.map(|joined| {
            joined.unwrap_or_else(|e| {
                error!("Version fetch task did not complete: {}", e);
                VersionRecord::local_failure()
            })
        })
        .boxed()
        .shared()
    }
}

#[async_trait::async_trait]
impl<F: VersionFetcher, S: RecordStore> VersionLookup for VersionCache<F, S> {
    async fn get_or_lookup(&self, url: &str) -> VersionRecord {
        VersionCache::get_or_lookup(self, url).await
    }

    fn stats(&self) -> CacheStats {
        VersionCache::stats(self)
    }
}

/// Locks `mutex`, recovering the data if a previous holder panicked
///
/// Every critical section leaves the guarded maps consistent, so a poisoned
/// lock carries no torn state.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
