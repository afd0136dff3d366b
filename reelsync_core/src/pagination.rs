//! Infinite list pagination engine
//!
//! Cursor-based "fetch next page" protocol over a [`QueryOptions`]
//! descriptor. Pages accumulate in fetch order and the flattened collection
//! is written to the cache after every change, so realtime patches and
//! invalidations from mutations are observed on the next read.
//!
//! Concurrency rule: at most one in-flight fetch per query; a second
//! trigger while fetching is deduplicated into a no-op, not queued.

use crate::cache::retry::{with_retry, RetryPolicy};
use crate::cache::{CacheStore, EntryState};
use crate::error::{Error, Result};
use crate::queries::QueryOptions;
use crate::types::Paged;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Fetch state of one infinite query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    /// Fetching the next page
    Fetching,
    /// Pull-to-refresh: refetching page 1 while keeping rendered data
    Refetching,
}

/// Outcome of a `fetch_next` trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was fetched; carries the number of items appended
    Fetched(usize),
    /// A fetch was already in flight; no request was sent
    AlreadyFetching,
    /// Pagination is exhausted; no request was sent
    Exhausted,
    /// The query is disabled; no request was sent
    Disabled,
}

struct Inner<T> {
    pages: Vec<Paged<T>>,
    state: FetchState,
    current_page: u32,
    has_next: bool,
    last_error: Option<String>,
}

impl<T> Inner<T> {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            state: FetchState::Idle,
            current_page: 0,
            has_next: true,
            last_error: None,
        }
    }

    fn flattened(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.pages.iter().flat_map(|page| page.data.clone()).collect()
    }
}

/// Paged query with accumulated pages and dedup of concurrent triggers
pub struct InfiniteQuery<T> {
    options: QueryOptions<T>,
    cache: CacheStore,
    retry: RetryPolicy,
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> InfiniteQuery<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + 'static,
{
    /// Build an engine over a query descriptor
    ///
    /// `retry` applies to initial page fetches only; later pages surface
    /// errors for manual retry.
    pub fn new(options: QueryOptions<T>, cache: CacheStore, retry: RetryPolicy) -> Self {
        Self {
            options,
            cache,
            retry,
            inner: Arc::new(Mutex::new(Inner::new())),
        }
    }

    /// Trigger a fetch of the next page
    ///
    /// The consumer calls this when the user nears the end of the rendered
    /// list. While a fetch is in flight further triggers are no-ops, and
    /// once `has_next_page` is false no request is sent at all.
    pub async fn fetch_next(&self) -> Result<FetchOutcome> {
        if !self.options.enabled {
            return Ok(FetchOutcome::Disabled);
        }

        let next_page = {
            let mut inner = self.inner.lock().await;
            if inner.state != FetchState::Idle {
                debug!("fetch already in flight for {}", self.options.key);
                return Ok(FetchOutcome::AlreadyFetching);
            }
            if !inner.has_next {
                return Ok(FetchOutcome::Exhausted);
            }
            inner.state = FetchState::Fetching;
            inner.current_page + 1
        };

        let result = if next_page == 1 {
            with_retry(&self.retry, || (self.options.fetch)(next_page)).await
        } else {
            (self.options.fetch)(next_page).await
        };

        let mut inner = self.inner.lock().await;
        inner.state = FetchState::Idle;

        match result {
            Ok(page) => {
                let appended = page.data.len();
                let fetched_page = page.pagination.current_page;
                inner.current_page = fetched_page;
                inner.has_next = page.next_page().is_some();
                let new_items = page.data.clone();
                inner.pages.push(page);
                inner.last_error = None;

                let flattened = inner.flattened();
                drop(inner);

                // The cache entry is the shared collection realtime patches
                // land in; later pages append to it instead of overwriting
                // it with the engine's private copy. Page 1 starts the
                // collection over.
                let merged = if fetched_page <= 1 {
                    flattened
                } else {
                    match self.cache.get::<Vec<T>>(&self.options.key).await {
                        Some(mut current) => {
                            current.extend(new_items);
                            current
                        }
                        None => flattened,
                    }
                };
                self.cache.put(&self.options.key, &merged).await?;

                Ok(FetchOutcome::Fetched(appended))
            }
            Err(error) => {
                warn!("page {next_page} fetch failed for {}: {error}", self.options.key);
                inner.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Pull-to-refresh: refetch from page 1 without clearing rendered data
    ///
    /// Already-accumulated pages stay visible until the fresh first page
    /// arrives, avoiding flicker; on success they are replaced wholesale.
    pub async fn refetch(&self) -> Result<()> {
        if !self.options.enabled {
            return Ok(());
        }

        {
            let mut inner = self.inner.lock().await;
            if inner.state != FetchState::Idle {
                return Ok(());
            }
            inner.state = FetchState::Refetching;
        }

        let result = with_retry(&self.retry, || (self.options.fetch)(1)).await;

        let mut inner = self.inner.lock().await;
        inner.state = FetchState::Idle;

        match result {
            Ok(page) => {
                inner.current_page = page.pagination.current_page;
                inner.has_next = page.next_page().is_some();
                inner.pages = vec![page];
                inner.last_error = None;

                let flattened = inner.flattened();
                drop(inner);
                self.cache.put(&self.options.key, &flattened).await?;
                Ok(())
            }
            Err(error) => {
                inner.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// The flattened collection, refreshed if the cache entry went stale
    ///
    /// Prefers the cached collection so patches applied by the realtime
    /// engine are visible without a refetch; a stale or missing entry
    /// (mutation invalidation, external clear) triggers one. While another
    /// fetch is in flight, stale data is served as-is instead of erroring.
    pub async fn items(&self) -> Result<Vec<T>> {
        match self.cache.state(&self.options.key).await {
            EntryState::Fresh => {
                if let Some(items) = self.cache.get::<Vec<T>>(&self.options.key).await {
                    return Ok(items);
                }
                // Entry vanished between the state check and the read
                self.refetch().await?;
            }
            EntryState::Stale | EntryState::Missing => {
                self.refetch().await?;
            }
        }

        if let Some(items) = self.cache.get::<Vec<T>>(&self.options.key).await {
            return Ok(items);
        }
        // refetch() no-ops while a fetch is already in flight; the stale
        // entry stays renderable until that fetch lands
        if let Some(items) = self.cache.get_stale::<Vec<T>>(&self.options.key).await {
            return Ok(items);
        }

        Err(Error::Internal(crate::error::InternalError::cache(format!(
            "collection missing after refetch: {}",
            self.options.key
        ))))
    }

    pub async fn has_next_page(&self) -> bool {
        self.inner.lock().await.has_next
    }

    pub async fn state(&self) -> FetchState {
        self.inner.lock().await.state
    }

    pub async fn current_page(&self) -> u32 {
        self.inner.lock().await.current_page
    }

    /// Last fetch error, kept for inline "no results/error" affordances
    pub async fn last_error(&self) -> Option<String> {
        self.inner.lock().await.last_error.clone()
    }
}
