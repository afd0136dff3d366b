//! Query and mutation option factories
//!
//! Each entity gets a factory that packages a cache key, a fetch function,
//! pagination cursor logic and an enablement predicate into a declarative
//! descriptor. The pagination engine and the client facade consume these
//! descriptors; screens never build keys or fetch functions by hand.
//!
//! Mutation factories live next to the query keys they affect so the
//! "mutation → invalidated key prefixes" tables stay auditable.

use crate::cache::QueryClass;
use crate::error::Result;
use crate::key::QueryKey;
use crate::types::Paged;
use futures::future::BoxFuture;
use std::sync::Arc;

pub mod playlists;
pub mod profile;
pub mod recos;
pub mod search;
pub mod watchlist;

/// Type-erased page fetch function
pub type PageFetch<T> = Arc<dyn Fn(u32) -> BoxFuture<'static, Result<Paged<T>>> + Send + Sync>;

/// Type-erased flat fetch function
pub type FlatFetch<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// Descriptor for a paged read
///
/// `enabled` gates execution; the fetch function still rejects missing
/// required parameters with a precondition error as a defensive
/// double-check.
pub struct QueryOptions<T> {
    pub key: QueryKey,
    pub enabled: bool,
    pub class: QueryClass,
    pub fetch: PageFetch<T>,
}

impl<T> Clone for QueryOptions<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            enabled: self.enabled,
            class: self.class,
            fetch: self.fetch.clone(),
        }
    }
}

/// Descriptor for a single-entity read
pub struct FlatQueryOptions<T> {
    pub key: QueryKey,
    pub enabled: bool,
    pub class: QueryClass,
    pub fetch: FlatFetch<T>,
}

impl<T> Clone for FlatQueryOptions<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            enabled: self.enabled,
            class: self.class,
            fetch: self.fetch.clone(),
        }
    }
}
