//! Patch application and fallback refetch
//!
//! State machine per subscribed resource:
//! `unsubscribed → authorizing → subscribed → (receiving patches)*`.
//! Authorization is checked once before subscribing, never per event.
//! Setup is an explicit cancellable task: teardown during setup marks
//! cancel-on-complete so a handle that does not exist yet is never touched,
//! and teardown is idempotent.

use crate::cache::CacheStore;
use crate::error::{InternalError, Result};
use crate::key::QueryKey;
use crate::realtime::{ChannelHandle, PatchEvent, RealtimeChannel};
use crate::types::Keyed;
use futures::future::BoxFuture;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Refetch of a resource's canonical query, run after patch failures
pub type RefetchFn = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Setup/teardown state of one subscription
enum SetupState {
    /// Setup task still running; `cancelled` requests close-on-complete
    Pending { cancelled: bool },
    /// Channel is open
    Active(ChannelHandle),
    Closed,
}

/// Handle to a realtime subscription
///
/// Returned immediately while setup (authorization + channel open) runs in
/// the background; closing before setup completes is safe.
pub struct Subscription {
    state: Arc<Mutex<SetupState>>,
}

impl Subscription {
    /// Tear the subscription down; idempotent, safe before setup resolves
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        match &*state {
            SetupState::Pending { .. } => {
                *state = SetupState::Pending { cancelled: true };
            }
            SetupState::Active(handle) => {
                handle.unsubscribe();
                *state = SetupState::Closed;
            }
            SetupState::Closed => {}
        }
    }

    pub async fn is_active(&self) -> bool {
        matches!(&*self.state.lock().await, SetupState::Active(_))
    }

    pub async fn is_closed(&self) -> bool {
        matches!(&*self.state.lock().await, SetupState::Closed)
    }
}

/// Applies patch events to one cached collection
///
/// Any event that cannot be applied cleanly (missing id, malformed
/// payload, collection not cached or stale) marks the collection dirty;
/// a debounced refetch collapses bursts of failures into a single request.
pub struct Reconciler<T> {
    cache: CacheStore,
    key: QueryKey,
    refetch: RefetchFn,
    debounce: Duration,
    dirty_epoch: Arc<AtomicU64>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Reconciler<T>
where
    T: Keyed + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(cache: CacheStore, key: QueryKey, refetch: RefetchFn, debounce: Duration) -> Self {
        Self {
            cache,
            key,
            refetch,
            debounce,
            dirty_epoch: Arc::new(AtomicU64::new(0)),
            _marker: PhantomData,
        }
    }

    /// Apply one event, falling back to the dirty/refetch path on failure
    ///
    /// Never surfaces an error to the caller; realtime failures are
    /// internal.
    pub async fn handle(&self, event: &PatchEvent) {
        if let Err(error) = self.try_apply(event).await {
            debug!("patch apply failed for {}: {error}", self.key);
            self.mark_dirty();
        }
    }

    async fn try_apply(&self, event: &PatchEvent) -> Result<()> {
        // Only a fresh collection can be patched; a stale or missing entry
        // needs the full refetch anyway
        let mut items: Vec<T> = self
            .cache
            .get(&self.key)
            .await
            .ok_or_else(|| InternalError::patch_failed("collection not cached"))?;

        match event.event.as_str() {
            "INSERT" => {
                let item = parse_row::<T>(&event.payload.new, "new")?;
                if items.iter().any(|i| i.entry_id() == item.entry_id()) {
                    return Err(InternalError::patch_failed("insert for existing id").into());
                }
                items.push(item);
            }
            "UPDATE" => {
                let item = parse_row::<T>(&event.payload.new, "new")?;
                let position = items
                    .iter()
                    .position(|i| i.entry_id() == item.entry_id())
                    .ok_or_else(|| InternalError::patch_failed("update for unknown id"))?;
                items[position] = item;
            }
            "DELETE" => {
                let old = parse_row::<T>(&event.payload.old, "old")?;
                let position = items
                    .iter()
                    .position(|i| i.entry_id() == old.entry_id())
                    .ok_or_else(|| InternalError::patch_failed("delete for unknown id"))?;
                items.remove(position);
            }
            other => {
                return Err(InternalError::patch_failed(format!("unknown event: {other}")).into());
            }
        }

        self.cache.put(&self.key, &items).await
    }

    /// Schedule the debounced fallback refetch
    ///
    /// Each failure bumps the epoch; only the task holding the latest
    /// epoch refetches, so a burst inside the window collapses into one.
    fn mark_dirty(&self) {
        let epoch = self.dirty_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let dirty_epoch = self.dirty_epoch.clone();
        let refetch = self.refetch.clone();
        let debounce = self.debounce;
        let key = self.key.clone();

        tokio::spawn(async move {
            sleep(debounce).await;
            if dirty_epoch.load(Ordering::SeqCst) == epoch {
                debug!("dirty collection, refetching: {key}");
                if let Err(error) = (refetch)().await {
                    warn!("fallback refetch failed for {key}: {error}");
                }
            }
        });
    }
}

fn parse_row<T: DeserializeOwned>(
    value: &Option<serde_json::Value>,
    field: &str,
) -> Result<T> {
    let value = value
        .as_ref()
        .ok_or_else(|| InternalError::patch_failed(format!("missing {field} row")))?;
    serde_json::from_value(value.clone())
        .map_err(|e| InternalError::patch_failed(format!("malformed {field} row: {e}")).into())
}

/// Opens realtime channels and drives reconciliation
#[derive(Clone)]
pub struct RealtimeEngine {
    channel: Arc<dyn RealtimeChannel>,
}

impl RealtimeEngine {
    pub fn new(channel: Arc<dyn RealtimeChannel>) -> Self {
        Self { channel }
    }

    /// Subscribe to a resource, applying events through `reconciler`
    ///
    /// `authorize` is the one-time authorization query; a denied or failed
    /// check closes the subscription without opening a channel. The
    /// returned handle is live immediately; setup completes in the
    /// background.
    pub fn subscribe<T, A>(
        &self,
        resource: String,
        authorize: A,
        reconciler: Reconciler<T>,
    ) -> Subscription
    where
        T: Keyed + Serialize + DeserializeOwned + Send + Sync + 'static,
        A: Future<Output = Result<bool>> + Send + 'static,
    {
        let state = Arc::new(Mutex::new(SetupState::Pending { cancelled: false }));
        let channel = self.channel.clone();
        let task_state = state.clone();

        tokio::spawn(async move {
            let authorized = match authorize.await {
                Ok(authorized) => authorized,
                Err(error) => {
                    warn!("realtime authorization failed for {resource}: {error}");
                    false
                }
            };
            if !authorized {
                debug!("not authorized for realtime on {resource}");
                *task_state.lock().await = SetupState::Closed;
                return;
            }

            let (mut events, handle) = match channel.subscribe(&resource).await {
                Ok(subscribed) => subscribed,
                Err(error) => {
                    warn!("realtime subscribe failed for {resource}: {error}");
                    *task_state.lock().await = SetupState::Closed;
                    return;
                }
            };

            {
                let mut state = task_state.lock().await;
                match &*state {
                    SetupState::Pending { cancelled: true } => {
                        // Torn down while setup was in flight
                        handle.unsubscribe();
                        *state = SetupState::Closed;
                        return;
                    }
                    _ => {
                        *state = SetupState::Active(handle);
                    }
                }
            }

            // The receiver ends when the channel is unsubscribed
            while let Some(event) = events.recv().await {
                reconciler.handle(&event).await;
            }
            debug!("realtime event loop ended for {resource}");
        });

        Subscription { state }
    }
}
