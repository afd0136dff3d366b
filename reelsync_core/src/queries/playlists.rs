//! Playlist query and mutation factories
//!
//! The playlist items key is the canonical collection the realtime engine
//! patches during collaborative editing.

use crate::backend::Backend;
use crate::cache::QueryClass;
use crate::error::Result;
use crate::key::{playlist_guests_key, playlist_items_key, playlists_key, QueryKey};
use crate::mutation::{MutationOutcome, MutationRunner, MutationSpec};
use crate::queries::QueryOptions;
use crate::types::{EntryId, MediaId, Playlist, PlaylistId, PlaylistItem, Profile, UserId};
use futures::FutureExt;
use std::sync::Arc;

/// Descriptor for a user's playlists
pub fn playlists_query(backend: Arc<dyn Backend>, user: UserId) -> QueryOptions<Playlist> {
    let key = playlists_key(&user);

    let fetch = Arc::new(move |page: u32| {
        let backend = backend.clone();
        let user = user.clone();
        async move { backend.playlists(&user, page).await }.boxed()
    });

    QueryOptions {
        key,
        enabled: true,
        class: QueryClass::Interactive,
        fetch,
    }
}

/// Descriptor for the items of one playlist
pub fn playlist_items_query(
    backend: Arc<dyn Backend>,
    playlist: PlaylistId,
) -> QueryOptions<PlaylistItem> {
    let key = playlist_items_key(playlist);

    let fetch = Arc::new(move |page: u32| {
        let backend = backend.clone();
        async move { backend.playlist_items(playlist, page).await }.boxed()
    });

    QueryOptions {
        key,
        enabled: true,
        class: QueryClass::Interactive,
        fetch,
    }
}

/// Descriptor for the guests invited to a playlist
pub fn playlist_guests_query(
    backend: Arc<dyn Backend>,
    playlist: PlaylistId,
) -> QueryOptions<Profile> {
    let key = playlist_guests_key(playlist);

    let fetch = Arc::new(move |page: u32| {
        let backend = backend.clone();
        async move { backend.playlist_guests(playlist, page).await }.boxed()
    });

    QueryOptions {
        key,
        enabled: true,
        class: QueryClass::Background,
        fetch,
    }
}

/// Key prefixes a playlist item write can affect
///
/// The owning user's playlists list shows item counts, so it is invalidated
/// alongside the items themselves.
pub fn playlist_item_invalidates(user: &UserId, playlist: PlaylistId) -> Vec<QueryKey> {
    vec![playlist_items_key(playlist), playlists_key(user)]
}

/// Add a media to a playlist
pub async fn add_item(
    runner: &MutationRunner,
    backend: Arc<dyn Backend>,
    user: &UserId,
    playlist: PlaylistId,
    media: Option<MediaId>,
) -> Result<MutationOutcome<PlaylistItem>> {
    let spec = media.map(|_| MutationSpec {
        success_key: "playlists.item_added",
        invalidates: playlist_item_invalidates(user, playlist),
    });

    runner
        .run(spec, async move {
            match media {
                Some(id) => backend.add_playlist_item(playlist, id).await,
                None => Err(crate::mutation::MutationRejection::Unknown),
            }
        })
        .await
}

/// Remove an item from a playlist
pub async fn remove_item(
    runner: &MutationRunner,
    backend: Arc<dyn Backend>,
    user: &UserId,
    playlist: PlaylistId,
    item: Option<EntryId>,
) -> Result<MutationOutcome<()>> {
    let spec = item.map(|_| MutationSpec {
        success_key: "playlists.item_removed",
        invalidates: playlist_item_invalidates(user, playlist),
    });

    runner
        .run(spec, async move {
            match item {
                Some(id) => backend.remove_playlist_item(playlist, id).await,
                None => Ok(()),
            }
        })
        .await
}
