//! Realtime collaboration support
//!
//! A per-resource broadcast channel delivers row-level patch events for
//! collaboratively edited playlists. The reconciliation engine applies
//! them to the cached collection and falls back to a debounced full
//! refetch when a patch cannot be applied cleanly.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

pub mod engine;

pub use engine::{RealtimeEngine, Reconciler, RefetchFn, Subscription};

/// Row-level change broadcast on a resource channel
///
/// Events for one resource arrive in emission order per connection, but
/// events can be missed across reconnects; consumers must tolerate gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchEvent {
    pub event: String,
    pub payload: PatchPayload,
}

/// Old/new row images carried by a patch event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchPayload {
    #[serde(default)]
    pub old: Option<serde_json::Value>,
    #[serde(default)]
    pub new: Option<serde_json::Value>,
}

impl PatchEvent {
    pub fn insert(new: serde_json::Value) -> Self {
        Self {
            event: "INSERT".to_string(),
            payload: PatchPayload {
                old: None,
                new: Some(new),
            },
        }
    }

    pub fn update(old: serde_json::Value, new: serde_json::Value) -> Self {
        Self {
            event: "UPDATE".to_string(),
            payload: PatchPayload {
                old: Some(old),
                new: Some(new),
            },
        }
    }

    pub fn delete(old: serde_json::Value) -> Self {
        Self {
            event: "DELETE".to_string(),
            payload: PatchPayload {
                old: Some(old),
                new: None,
            },
        }
    }
}

/// Handle to an open channel; unsubscribing is idempotent
#[derive(Clone)]
pub struct ChannelHandle {
    closed: Arc<AtomicBool>,
    on_close: Arc<dyn Fn() + Send + Sync>,
}

impl ChannelHandle {
    pub fn new(on_close: Arc<dyn Fn() + Send + Sync>) -> Self {
        Self {
            closed: Arc::new(AtomicBool::new(false)),
            on_close,
        }
    }

    /// Close the channel; safe to call more than once
    pub fn unsubscribe(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            (self.on_close)();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Transport seam for per-resource broadcast channels
///
/// The session token must already be attached by the implementation;
/// the core checks authorization separately before subscribing.
#[async_trait]
pub trait RealtimeChannel: Send + Sync {
    async fn subscribe(
        &self,
        resource: &str,
    ) -> Result<(mpsc::Receiver<PatchEvent>, ChannelHandle)>;
}
