//! Shared cache store with prefix invalidation and in-flight dedup

use crate::cache::{CacheEntry, CacheStats, EntryState};
use crate::error::Result;
use crate::key::QueryKey;
use log::{debug, trace};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::{Mutex, RwLock};

/// Process-wide query result cache
///
/// Cheap to clone; all clones share the same storage. Reads are shared,
/// writes go through the store API so invalidation fan-out stays
/// centralized.
#[derive(Clone)]
pub struct CacheStore {
    inner: Arc<Inner>,
}

struct Inner {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
    stats: RwLock<CacheStats>,
    /// Per-key fetch gates: the first caller fetches, concurrent callers
    /// wait on the gate and then read the freshly cached value
    gates: Mutex<HashMap<QueryKey, Arc<Mutex<()>>>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(HashMap::new()),
                stats: RwLock::new(CacheStats::default()),
                gates: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Get a fresh cached value, deserialized to `T`
    ///
    /// Returns `None` for missing or stale entries; the caller is expected
    /// to refetch in both cases.
    pub async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.inner.entries.read().await;
        let hit = entries.get(key).filter(|entry| !entry.stale).and_then(|entry| {
            serde_json::from_value(entry.value.clone()).ok()
        });

        let mut stats = self.inner.stats.write().await;
        if hit.is_some() {
            stats.hit_count += 1;
        } else {
            stats.miss_count += 1;
        }

        hit
    }

    /// Get a cached value even when the entry is stale
    ///
    /// Stale data is still renderable while a refetch is pending.
    pub async fn get_stale<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.inner.entries.read().await;
        entries
            .get(key)
            .and_then(|entry| serde_json::from_value(entry.value.clone()).ok())
    }

    /// Store a value, replacing any previous entry and clearing staleness
    pub async fn put<T: Serialize>(&self, key: &QueryKey, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        let mut entries = self.inner.entries.write().await;

        let replaced = entries
            .insert(
                key.clone(),
                CacheEntry {
                    value,
                    inserted_at: SystemTime::now(),
                    stale: false,
                },
            )
            .is_some();

        if !replaced {
            let mut stats = self.inner.stats.write().await;
            stats.entry_count += 1;
        }
        trace!("cache put: {key}");

        Ok(())
    }

    /// Freshness of the entry under `key`
    pub async fn state(&self, key: &QueryKey) -> EntryState {
        let entries = self.inner.entries.read().await;
        match entries.get(key) {
            None => EntryState::Missing,
            Some(entry) if entry.stale => EntryState::Stale,
            Some(_) => EntryState::Fresh,
        }
    }

    /// Mark every entry under `prefix` stale, returning how many were marked
    ///
    /// Stale entries keep their data (consumers may keep rendering it) but
    /// any read through [`CacheStore::get`] or a query layer triggers a
    /// refetch.
    pub async fn invalidate_prefix(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.inner.entries.write().await;
        let mut marked = 0;

        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) && !entry.stale {
                entry.stale = true;
                marked += 1;
            }
        }

        if marked > 0 {
            debug!("invalidated {marked} entries under {prefix}");
            let mut stats = self.inner.stats.write().await;
            stats.invalidation_count += marked as u64;
        }

        marked
    }

    /// Remove the entry under `key` entirely
    pub async fn remove(&self, key: &QueryKey) {
        let mut entries = self.inner.entries.write().await;
        if entries.remove(key).is_some() {
            let mut stats = self.inner.stats.write().await;
            stats.entry_count -= 1;
        }
    }

    /// Drop all entries
    pub async fn clear(&self) {
        let mut entries = self.inner.entries.write().await;
        entries.clear();
        let mut stats = self.inner.stats.write().await;
        stats.entry_count = 0;
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.stats.read().await.clone()
    }

    /// Fetch-through with in-flight dedup
    ///
    /// If a fresh value is cached it is returned without calling `fetch`.
    /// Otherwise at most one concurrent caller per key runs `fetch`; the
    /// rest wait on the per-key gate and read the value it cached.
    pub async fn fetch_with<T, F, Fut>(&self, key: &QueryKey, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let gate = {
            let mut gates = self.inner.gates.lock().await;
            gates
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let guard = gate.lock().await;

        // A concurrent fetch may have completed while we waited on the gate
        let result = match self.get(key).await {
            Some(value) => Ok(value),
            None => {
                debug!("cache miss, fetching: {key}");
                match fetch().await {
                    Ok(value) => self.put(key, &value).await.map(|_| value),
                    Err(error) => Err(error),
                }
            }
        };

        drop(guard);
        // The last caller out removes the gate; waiters still hold clones,
        // so the count check under the map lock cannot race a new clone
        let mut gates = self.inner.gates.lock().await;
        if Arc::strong_count(&gate) == 2 {
            gates.remove(key);
        }

        result
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}
