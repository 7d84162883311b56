//! Backing storage for the version cache
//!
//! The cache only talks to [`RecordStore`], so the unbounded [`MemoryStore`]
//! can be swapped for the size-limited [`BoundedStore`] without touching the
//! cache or the handler.

use std::collections::HashMap;
use std::time::Duration;

use indexmap::IndexMap;
use tokio::time::Instant;
use tracing::debug;

use crate::relay::record::VersionRecord;

/// Keyed storage of the latest record per upstream URL
///
/// Implementations are not synchronized; the cache serializes access.
pub trait RecordStore: Send + 'static {
    /// Returns a copy of the stored record for `url`
    fn get(&mut self, url: &str) -> Option<VersionRecord>;

    /// Stores `record` for `url`, replacing any previous one
    fn put(&mut self, url: &str, record: VersionRecord);

    /// URLs whose records are at least `freshness` old at `now`
    fn stale_urls(&self, now: Instant, freshness: Duration) -> Vec<String>;

    /// Number of records currently held
    fn record_count(&self) -> usize;
}

/// Unbounded map; entries live for the whole process
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<String, VersionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get(&mut self, url: &str) -> Option<VersionRecord> {
        self.records.get(url).cloned()
    }

    fn put(&mut self, url: &str, record: VersionRecord) {
        self.records.insert(url.to_string(), record);
    }

    fn stale_urls(&self, now: Instant, freshness: Duration) -> Vec<String> {
        self.records
            .iter()
            .filter(|(_, record)| !record.is_fresh(now, freshness))
            .map(|(url, _)| url.clone())
            .collect()
    }

    fn record_count(&self) -> usize {
        self.records.len()
    }
}

/// Store holding at most `capacity` records, evicting the least recently used
///
/// Recency is kept as insertion order of the underlying `IndexMap`: every
/// hit or write moves the entry to the back, eviction pops the front.
#[derive(Debug)]
pub struct BoundedStore {
    records: IndexMap<String, VersionRecord>,
    capacity: usize,
}

impl BoundedStore {
    /// A capacity of zero is raised to one so the latest record is always kept
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: IndexMap::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl RecordStore for BoundedStore {
    fn get(&mut self, url: &str) -> Option<VersionRecord> {
        let index = self.records.get_index_of(url)?;
        let last = self.records.len() - 1;
        self.records.move_index(index, last);
        self.records.get_index(last).map(|(_, record)| record.clone())
    }

    fn put(&mut self, url: &str, record: VersionRecord) {
        self.records.shift_remove(url);

        while self.records.len() >= self.capacity {
            if let Some((evicted, _)) = self.records.shift_remove_index(0) {
                debug!("Evicting cached record for {}", evicted);
            }
        }

        self.records.insert(url.to_string(), record);
    }

    fn stale_urls(&self, now: Instant, freshness: Duration) -> Vec<String> {
        self.records
            .iter()
            .filter(|(_, record)| !record.is_fresh(now, freshness))
            .map(|(url, _)| url.clone())
            .collect()
    }

    fn record_count(&self) -> usize {
        self.records.len()
    }
}
