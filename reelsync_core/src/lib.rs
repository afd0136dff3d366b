//! ReelSync Core Library
//!
//! Client-side data synchronization core for a social movie and TV
//! recommendation app: shared query cache with prefix invalidation,
//! infinite-list pagination, fuzzy search and sort pipeline, realtime
//! playlist reconciliation and an ack-then-invalidate mutation layer.

pub mod auth;
pub mod backend;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod key;
pub mod mutation;
pub mod pagination;
pub mod pipeline;
pub mod prefs;
pub mod queries;
pub mod realtime;
pub mod types;

// Re-export main types
pub use backend::{Backend, MutationResult, SessionProvider, SessionToken};
pub use cache::{CacheStore, EntryState, QueryClass, RetryPolicy};
pub use client::SyncClient;
pub use config::{ClientConfig, ConfigManager};
pub use error::{BackendError, Error, InternalError, PreconditionError, Result};
pub use key::QueryKey;
pub use mutation::{
    MessageCatalog, MutationOutcome, MutationRejection, MutationRunner, MutationSpec, Notifier,
};
pub use pagination::{FetchOutcome, FetchState, InfiniteQuery};
pub use queries::{FlatQueryOptions, QueryOptions};
pub use realtime::{
    ChannelHandle, PatchEvent, PatchPayload, RealtimeChannel, RealtimeEngine, Reconciler,
    Subscription,
};
pub use types::{Paged, Pagination};
