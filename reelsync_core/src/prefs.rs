//! Persisted view preferences
//!
//! Process-wide client state (active sort, view toggles, onboarding flag)
//! with a defined lifecycle: hydrate once on startup from the external
//! key-value store, write through on every mutation. Kept entirely apart
//! from the sync core's query cache.

use crate::pipeline::SortOrder;
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

const PREFS_KEY: &str = "reelsync.prefs";

/// External persistent key-value collaborator
///
/// Keys are plain strings, values JSON-serialized strings; survives app
/// restarts.
pub trait KvStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

/// Sort selection persisted per collection view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortChoice {
    CreatedAt,
    Title,
    ReleaseYear,
    Rank,
}

/// The persisted preference set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefs {
    pub watchlist_sort: SortChoice,
    pub watchlist_order: SortOrder,
    pub grid_view: bool,
    pub has_onboarded: bool,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            watchlist_sort: SortChoice::CreatedAt,
            watchlist_order: SortOrder::Desc,
            grid_view: false,
            has_onboarded: false,
        }
    }
}

/// In-memory preference store with write-through persistence
pub struct PrefsStore {
    storage: Arc<dyn KvStorage>,
    state: RwLock<Prefs>,
}

impl PrefsStore {
    /// Hydrate from storage; malformed or missing persisted state falls
    /// back to defaults
    pub fn hydrate(storage: Arc<dyn KvStorage>) -> Self {
        let state = storage
            .get(PREFS_KEY)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(prefs) => Some(prefs),
                Err(error) => {
                    warn!("discarding malformed persisted prefs: {error}");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            storage,
            state: RwLock::new(state),
        }
    }

    pub async fn current(&self) -> Prefs {
        self.state.read().await.clone()
    }

    /// Mutate preferences and persist the result
    pub async fn update(&self, apply: impl FnOnce(&mut Prefs)) {
        let mut state = self.state.write().await;
        apply(&mut state);
        match serde_json::to_string(&*state) {
            Ok(raw) => self.storage.set(PREFS_KEY, raw),
            Err(error) => warn!("failed to persist prefs: {error}"),
        }
    }
}
