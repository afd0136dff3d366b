//! Watchlist query and mutation factories

use crate::backend::Backend;
use crate::cache::QueryClass;
use crate::error::Result;
use crate::key::{watchlist_count_key, watchlist_key, QueryKey};
use crate::mutation::{MutationOutcome, MutationRunner, MutationSpec};
use crate::queries::{FlatQueryOptions, QueryOptions};
use crate::types::{EntryId, UserId, WatchlistEntry};
use futures::FutureExt;
use std::sync::Arc;

/// Descriptor for a user's paged watchlist
pub fn watchlist_query(backend: Arc<dyn Backend>, user: UserId) -> QueryOptions<WatchlistEntry> {
    let key = watchlist_key(&user);

    let fetch = Arc::new(move |page: u32| {
        let backend = backend.clone();
        let user = user.clone();
        async move { backend.watchlist(&user, page).await }.boxed()
    });

    QueryOptions {
        key,
        enabled: true,
        class: QueryClass::Interactive,
        fetch,
    }
}

/// Descriptor for the watchlist count widget
pub fn watchlist_count_query(backend: Arc<dyn Backend>, user: UserId) -> FlatQueryOptions<u64> {
    let key = watchlist_count_key(&user);

    let fetch = Arc::new(move || {
        let backend = backend.clone();
        let user = user.clone();
        async move { backend.watchlist_count(&user).await }.boxed()
    });

    FlatQueryOptions {
        key,
        enabled: true,
        class: QueryClass::Background,
        fetch,
    }
}

/// Key prefixes a watchlist write can affect
///
/// The list key is a prefix of the count key, so one entry covers both.
pub fn watchlist_invalidates(user: &UserId) -> Vec<QueryKey> {
    vec![watchlist_key(user)]
}

/// Delete a watchlist entry
///
/// No-ops when nothing is selected instead of sending a degenerate
/// request.
pub async fn delete_entry(
    runner: &MutationRunner,
    backend: Arc<dyn Backend>,
    user: &UserId,
    entry: Option<EntryId>,
) -> Result<MutationOutcome<()>> {
    let spec = entry.map(|_| MutationSpec {
        success_key: "watchlist.deleted",
        invalidates: watchlist_invalidates(user),
    });

    let user = user.clone();
    runner
        .run(spec, async move {
            // `spec` is None when `entry` is, so this unwrap-by-match never
            // sends without an id
            match entry {
                Some(id) => backend.delete_watchlist_entry(&user, id).await,
                None => Ok(()),
            }
        })
        .await
}

/// Mark a watchlist entry completed
pub async fn complete_entry(
    runner: &MutationRunner,
    backend: Arc<dyn Backend>,
    user: &UserId,
    entry: Option<EntryId>,
) -> Result<MutationOutcome<()>> {
    let spec = entry.map(|_| MutationSpec {
        success_key: "watchlist.completed",
        invalidates: watchlist_invalidates(user),
    });

    let user = user.clone();
    runner
        .run(spec, async move {
            match entry {
                Some(id) => backend.complete_watchlist_entry(&user, id).await,
                None => Ok(()),
            }
        })
        .await
}
