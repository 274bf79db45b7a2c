//! Cache Module
//!
//! In-memory, URL-keyed cache of fetched layer bytes with TTL expiry and a
//! soft capacity enforced by stale sweeps.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use stats::CacheStats;
pub use store::FetchCache;

// == Public Constants ==
/// Default freshness window for fetched layers, in seconds
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Default entry count above which inserts sweep stale entries
pub const DEFAULT_SOFT_CAPACITY: usize = 200;
