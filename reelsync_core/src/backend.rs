//! Remote backend seam
//!
//! The core depends only on these shapes, not on how the network call is
//! made. Paged reads return `{ data, pagination }`, flat reads return a
//! single entity, writes return an ack (or the rejection payload the
//! mutation layer maps to a user-visible message).

use crate::error::Result;
use crate::mutation::MutationRejection;
use crate::types::{
    EntryId, Locale, MediaId, MediaKind, MediaSummary, Paged, Playlist, PlaylistId, PlaylistItem,
    Profile, Reco, RecoTarget, SearchFilters, UserId, WatchlistEntry,
};
use async_trait::async_trait;

/// Result type for write operations
pub type MutationResult<T> = std::result::Result<T, MutationRejection>;

/// Bearer/session token attached to outgoing requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

/// Source of the current session token
///
/// Token acquisition and refresh live outside the core; it only consumes
/// "current valid token or none".
pub trait SessionProvider: Send + Sync {
    fn token(&self) -> Option<SessionToken>;
}

/// Remote backend the sync layer fetches from and mutates through
#[async_trait]
pub trait Backend: Send + Sync {
    // Paged reads

    async fn search(
        &self,
        locale: &Locale,
        kind: MediaKind,
        query: &str,
        filters: &SearchFilters,
        page: u32,
    ) -> Result<Paged<MediaSummary>>;

    async fn watchlist(&self, user: &UserId, page: u32) -> Result<Paged<WatchlistEntry>>;

    async fn recos(&self, user: &UserId, page: u32) -> Result<Paged<Reco>>;

    async fn reco_targets(
        &self,
        user: &UserId,
        media: MediaId,
        page: u32,
    ) -> Result<Paged<RecoTarget>>;

    async fn playlists(&self, user: &UserId, page: u32) -> Result<Paged<Playlist>>;

    async fn playlist_items(&self, playlist: PlaylistId, page: u32)
        -> Result<Paged<PlaylistItem>>;

    async fn playlist_guests(&self, playlist: PlaylistId, page: u32) -> Result<Paged<Profile>>;

    async fn following(&self, user: &UserId, page: u32) -> Result<Paged<Profile>>;

    // Flat reads

    async fn profile(&self, user: &UserId) -> Result<Profile>;

    async fn watchlist_count(&self, user: &UserId) -> Result<u64>;

    /// Authorization check run once before opening a realtime channel
    async fn can_edit_playlist(&self, user: &UserId, playlist: PlaylistId) -> Result<bool>;

    // Writes (ack-then-invalidate; no optimistic local patching)

    async fn delete_watchlist_entry(&self, user: &UserId, entry: EntryId) -> MutationResult<()>;

    async fn complete_watchlist_entry(&self, user: &UserId, entry: EntryId) -> MutationResult<()>;

    async fn send_reco(
        &self,
        from: &UserId,
        to: &[UserId],
        media: MediaId,
        as_watched: bool,
    ) -> MutationResult<()>;

    async fn add_playlist_item(
        &self,
        playlist: PlaylistId,
        media: MediaId,
    ) -> MutationResult<PlaylistItem>;

    async fn remove_playlist_item(&self, playlist: PlaylistId, item: EntryId)
        -> MutationResult<()>;

    async fn follow(&self, user: &UserId, target: &UserId) -> MutationResult<()>;

    async fn unfollow(&self, user: &UserId, target: &UserId) -> MutationResult<()>;
}
