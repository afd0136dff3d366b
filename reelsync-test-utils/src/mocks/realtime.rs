//! Mock realtime channel
//!
//! Retains the sender half of every subscription so tests can emit patch
//! events into the engine. Unsubscribing drops the sender, which ends the
//! engine's receive loop.

use async_trait::async_trait;
use reelsync_core::error::{InternalError, Result};
use reelsync_core::realtime::{ChannelHandle, PatchEvent, RealtimeChannel};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

struct Registered {
    resource: String,
    sender: mpsc::Sender<PatchEvent>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    subscriptions: HashMap<u64, Registered>,
    /// When true, `subscribe` fails as if the socket were down
    refuse: bool,
}

/// In-memory implementation of the realtime channel seam
#[derive(Clone, Default)]
pub struct MockChannel {
    state: Arc<Mutex<State>>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent subscribe attempt fail
    pub fn refuse_subscriptions(&self) {
        self.state.lock().unwrap().refuse = true;
    }

    /// Number of currently open subscriptions for `resource`
    pub fn open_subscriptions(&self, resource: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .values()
            .filter(|r| r.resource == resource)
            .count()
    }

    /// Emit an event to every open subscription on `resource`
    pub async fn emit(&self, resource: &str, event: PatchEvent) {
        let senders: Vec<mpsc::Sender<PatchEvent>> = {
            let state = self.state.lock().unwrap();
            state
                .subscriptions
                .values()
                .filter(|r| r.resource == resource)
                .map(|r| r.sender.clone())
                .collect()
        };

        for sender in senders {
            // A receiver dropped mid-test is fine; skip it
            let _ = sender.send(event.clone()).await;
        }
    }
}

#[async_trait]
impl RealtimeChannel for MockChannel {
    async fn subscribe(
        &self,
        resource: &str,
    ) -> Result<(mpsc::Receiver<PatchEvent>, ChannelHandle)> {
        let (sender, receiver) = mpsc::channel(32);

        let id = {
            let mut state = self.state.lock().unwrap();
            if state.refuse {
                return Err(InternalError::channel("subscription refused").into());
            }
            let id = state.next_id;
            state.next_id += 1;
            state.subscriptions.insert(
                id,
                Registered {
                    resource: resource.to_string(),
                    sender,
                },
            );
            id
        };

        let state = self.state.clone();
        let handle = ChannelHandle::new(Arc::new(move || {
            // Dropping the sender closes the receiver loop
            state.lock().unwrap().subscriptions.remove(&id);
        }));

        Ok((receiver, handle))
    }
}
