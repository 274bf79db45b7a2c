//! Fetch Cache Module
//!
//! URL-keyed store of fetched layer bytes with a fixed TTL and a soft entry cap.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;

use crate::cache::{CacheEntry, CacheStats};

// == Fetch Cache ==
/// Time-bounded cache of raw layer bytes keyed by URL.
///
/// Lookups only need `&self`, so readers share a read lock. Stale entries are
/// never served; they stay stored until a refetch overwrites them or a sweep
/// removes them.
///
/// The entry cap is soft: exceeding it after an insert triggers a sweep of
/// stale entries only, so fresh entries may keep the cache above the cap.
#[derive(Debug)]
pub struct FetchCache {
    /// URL -> bytes storage
    entries: HashMap<String, CacheEntry>,
    /// Lookup counters, bumped under a shared borrow
    hits: AtomicU64,
    misses: AtomicU64,
    /// Stale entries removed or overwritten
    evictions: u64,
    /// Entries at least this old are never served
    ttl: Duration,
    /// Entry count above which an insert sweeps stale entries
    soft_capacity: usize,
}

impl FetchCache {
    // == Constructor ==
    /// Creates an empty cache.
    pub fn new(ttl: Duration, soft_capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: 0,
            ttl,
            soft_capacity,
        }
    }

    // == Get ==
    /// Returns the cached bytes for `url` if a fresh entry exists.
    ///
    /// A stale entry counts as a miss.
    pub fn get(&self, url: &str) -> Option<Bytes> {
        match self.entries.get(url) {
            Some(entry) if !entry.is_stale(self.ttl) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.bytes.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    // == Insert ==
    /// Stores freshly fetched bytes, replacing any previous entry.
    pub fn insert(&mut self, url: String, bytes: Bytes) {
        let ttl = self.ttl;
        if let Some(previous) = self.entries.insert(url, CacheEntry::new(bytes)) {
            if previous.is_stale(ttl) {
                self.evictions += 1;
            }
        }

        if self.entries.len() > self.soft_capacity {
            let removed = self.cleanup_expired();
            tracing::debug!(
                removed,
                remaining = self.entries.len(),
                soft_capacity = self.soft_capacity,
                "Fetch cache over soft capacity, swept stale entries"
            );
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ..CacheStats::new()
        };
        stats.record_evictions(self.evictions as usize);
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all stale entries, returning how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_stale(ttl));
        let removed = before - self.entries.len();

        self.evictions += removed as u64;
        removed
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
