//! Client facade wiring the sync layers together
//!
//! One [`SyncClient`] per app session owns the shared cache, the mutation
//! runner and the realtime engine, and turns query descriptors into running
//! queries with the retry budget their class selects.

use crate::backend::Backend;
use crate::cache::retry::{with_retry, RetryPolicy};
use crate::cache::{CacheStore, QueryClass};
use crate::config::ClientConfig;
use crate::error::{PreconditionError, Result};
use crate::key::playlist_items_key;
use crate::mutation::{MessageCatalog, MutationRunner, Notifier};
use crate::pagination::InfiniteQuery;
use crate::pipeline::FuzzyOptions;
use crate::queries::{FlatQueryOptions, QueryOptions};
use crate::realtime::{RealtimeChannel, RealtimeEngine, Reconciler, Subscription};
use crate::types::{PlaylistId, PlaylistItem, UserId};
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Entry point for screens into the sync core
#[derive(Clone)]
pub struct SyncClient {
    backend: Arc<dyn Backend>,
    cache: CacheStore,
    config: ClientConfig,
    runner: MutationRunner,
    realtime: RealtimeEngine,
}

impl SyncClient {
    pub fn new(
        backend: Arc<dyn Backend>,
        channel: Arc<dyn RealtimeChannel>,
        notifier: Arc<dyn Notifier>,
        catalog: Arc<dyn MessageCatalog>,
        config: ClientConfig,
    ) -> Self {
        let cache = CacheStore::new();
        let runner = MutationRunner::new(cache.clone(), notifier, catalog);

        Self {
            backend,
            cache,
            config,
            runner,
            realtime: RealtimeEngine::new(channel),
        }
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        self.backend.clone()
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn mutations(&self) -> &MutationRunner {
        &self.runner
    }

    /// Fuzzy search tuning, from configuration
    pub fn fuzzy_options(&self) -> FuzzyOptions {
        FuzzyOptions {
            threshold: self.config.search.threshold,
        }
    }

    /// Retry budget for a query class, from configuration
    pub fn retry_policy(&self, class: QueryClass) -> RetryPolicy {
        match class {
            QueryClass::Interactive => RetryPolicy::none(),
            QueryClass::Background => RetryPolicy::new(
                self.config.retry.background_attempts,
                self.config.retry.retry_delay(),
            ),
        }
    }

    /// Start an infinite query over a paged descriptor
    pub fn infinite<T>(&self, options: QueryOptions<T>) -> InfiniteQuery<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + 'static,
    {
        let retry = self.retry_policy(options.class);
        InfiniteQuery::new(options, self.cache.clone(), retry)
    }

    /// Run a single-entity read through the cache
    ///
    /// Fresh cached values short-circuit; concurrent callers of the same
    /// key share one request.
    pub async fn fetch<T>(&self, options: &FlatQueryOptions<T>) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        if !options.enabled {
            return Err(PreconditionError::Disabled.into());
        }

        let retry = self.retry_policy(options.class);
        let fetch = options.fetch.clone();
        self.cache
            .fetch_with(&options.key, || async move {
                with_retry(&retry, || (fetch)()).await
            })
            .await
    }

    /// Subscribe to live edits on a playlist's items
    ///
    /// Authorization (edit access) is checked once before the channel
    /// opens; failed patches fall back to a debounced refetch of the
    /// cached collection.
    pub fn subscribe_playlist_items(
        &self,
        user: &UserId,
        playlist: PlaylistId,
    ) -> Subscription {
        let key = playlist_items_key(playlist);
        let debounce = self.config.realtime.debounce();

        let backend = self.backend.clone();
        let cache = self.cache.clone();
        let refetch_key = key.clone();
        let refetch = Arc::new(move || {
            let backend = backend.clone();
            let cache = cache.clone();
            let key = refetch_key.clone();
            async move {
                let page = backend.playlist_items(playlist, 1).await?;
                cache.put(&key, &page.data).await
            }
            .boxed()
        });

        let reconciler =
            Reconciler::<PlaylistItem>::new(self.cache.clone(), key, refetch, debounce);

        let auth_backend = self.backend.clone();
        let auth_user = user.clone();
        let authorize =
            async move { auth_backend.can_edit_playlist(&auth_user, playlist).await };

        self.realtime
            .subscribe(format!("playlist:{}", playlist.0), authorize, reconciler)
    }

    /// Debounce window used by realtime reconciliation
    pub fn realtime_debounce(&self) -> Duration {
        self.config.realtime.debounce()
    }
}
