//! Cache Entry Module
//!
//! Defines the immutable record stored per fetched layer URL.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;

// == Cache Entry ==
/// Raw layer bytes plus the time they were fetched.
///
/// Entries are never mutated; a refresh replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Encoded image bytes as returned by the object store
    pub bytes: Bytes,
    /// Fetch timestamp (Unix milliseconds)
    pub fetched_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(bytes: Bytes) -> Self {
        Self {
            bytes,
            fetched_at: current_timestamp_ms(),
        }
    }

    // == Is Stale ==
    /// Checks whether the entry has outlived `ttl`.
    ///
    /// Boundary condition: an entry is stale once its age is greater than or
    /// equal to the TTL, so a zero TTL never serves anything.
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.age_ms() >= ttl.as_millis() as u64
    }

    // == Age ==
    /// Milliseconds since the entry was fetched.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.fetched_at)
    }

    /// Remaining freshness in milliseconds, `0` once stale.
    pub fn ttl_remaining_ms(&self, ttl: Duration) -> u64 {
        (ttl.as_millis() as u64).saturating_sub(self.age_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(Bytes::from_static(b"png"));

        assert_eq!(entry.bytes.as_ref(), b"png");
        assert!(!entry.is_stale(Duration::from_secs(60)));
    }

    #[test]
    fn test_entry_goes_stale() {
        let entry = CacheEntry::new(Bytes::from_static(b"png"));
        let ttl = Duration::from_millis(50);

        assert!(!entry.is_stale(ttl));

        sleep(Duration::from_millis(80));

        assert!(entry.is_stale(ttl));
        assert_eq!(entry.ttl_remaining_ms(ttl), 0);
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = CacheEntry::new(Bytes::from_static(b"png"));

        let remaining = entry.ttl_remaining_ms(Duration::from_secs(10));
        assert!(remaining <= 10_000);
        assert!(remaining >= 9_000);
    }

    #[test]
    fn test_stale_boundary_condition() {
        let entry = CacheEntry {
            bytes: Bytes::new(),
            fetched_at: current_timestamp_ms(),
        };

        // Zero TTL: age >= 0 always holds
        assert!(entry.is_stale(Duration::ZERO), "Entry should be stale at boundary");
    }
}
