//! Explicit in-process cache runtime
//!
//! Query results are stored under structured [`QueryKey`]s as JSON values.
//! Staleness is tracked per entry; invalidating a key prefix marks every
//! suffixed entry stale so dependent queries refetch on their next read.
//! All mutation of cached data goes through [`store::CacheStore`]; cached
//! collections are never spliced in place by consumers.

use std::time::SystemTime;

pub mod retry;
pub mod store;

pub use retry::{QueryClass, RetryPolicy};
pub use store::CacheStore;

/// Cache entry storing a query result with metadata
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: serde_json::Value,
    pub inserted_at: SystemTime,
    pub stale: bool,
}

/// Freshness of a cached entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Missing,
    Fresh,
    Stale,
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub entry_count: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    pub invalidation_count: u64,
}
