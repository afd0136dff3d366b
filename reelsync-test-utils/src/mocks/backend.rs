//! Mock implementation of the backend seam
//!
//! Holds in-memory datasets served through the paged read protocol, with
//! per-method call counters, an optional artificial delay and injectable
//! failures. Writes mutate the datasets so invalidate-then-refetch paths
//! observe the post-mutation state.

use async_trait::async_trait;
use reelsync_core::backend::{Backend, MutationResult};
use reelsync_core::error::{BackendError, Result};
use reelsync_core::mutation::MutationRejection;
use reelsync_core::types::{
    EntryId, Locale, MediaId, MediaKind, MediaSummary, Paged, Pagination, Playlist, PlaylistId,
    PlaylistItem, Profile, Reco, RecoTarget, SearchFilters, UserId, WatchlistEntry,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Datasets {
    search_results: Vec<MediaSummary>,
    watchlist: Vec<WatchlistEntry>,
    recos: Vec<Reco>,
    reco_targets: Vec<RecoTarget>,
    playlists: Vec<Playlist>,
    playlist_items: Vec<PlaylistItem>,
    playlist_guests: Vec<Profile>,
    following: Vec<Profile>,
    profiles: HashMap<UserId, Profile>,
}

struct Behavior {
    page_size: usize,
    delay: Option<Duration>,
    can_edit_playlists: bool,
    /// Number of upcoming reads that fail before recovery
    failing_reads: u32,
    read_error: BackendError,
    /// When set, every write is rejected with this payload
    write_rejection: Option<String>,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            page_size: 20,
            delay: None,
            can_edit_playlists: true,
            failing_reads: 0,
            read_error: BackendError::new(503, "service unavailable"),
            write_rejection: None,
        }
    }
}

/// Configurable in-memory backend for tests
#[derive(Clone)]
pub struct MockBackend {
    data: Arc<Mutex<Datasets>>,
    behavior: Arc<Mutex<Behavior>>,
    calls: Arc<Mutex<HashMap<&'static str, u32>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(Datasets::default())),
            behavior: Arc::new(Mutex::new(Behavior::default())),
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // Dataset setup

    pub fn with_search_results(self, results: Vec<MediaSummary>) -> Self {
        self.data.lock().unwrap().search_results = results;
        self
    }

    pub fn with_watchlist(self, entries: Vec<WatchlistEntry>) -> Self {
        self.data.lock().unwrap().watchlist = entries;
        self
    }

    pub fn with_recos(self, recos: Vec<Reco>) -> Self {
        self.data.lock().unwrap().recos = recos;
        self
    }

    pub fn with_reco_targets(self, targets: Vec<RecoTarget>) -> Self {
        self.data.lock().unwrap().reco_targets = targets;
        self
    }

    pub fn with_playlists(self, playlists: Vec<Playlist>) -> Self {
        self.data.lock().unwrap().playlists = playlists;
        self
    }

    pub fn with_playlist_items(self, items: Vec<PlaylistItem>) -> Self {
        self.data.lock().unwrap().playlist_items = items;
        self
    }

    pub fn with_playlist_guests(self, guests: Vec<Profile>) -> Self {
        self.data.lock().unwrap().playlist_guests = guests;
        self
    }

    pub fn with_following(self, following: Vec<Profile>) -> Self {
        self.data.lock().unwrap().following = following;
        self
    }

    pub fn with_profile(self, profile: Profile) -> Self {
        self.data
            .lock()
            .unwrap()
            .profiles
            .insert(profile.id.clone(), profile);
        self
    }

    // Behavior setup

    pub fn with_page_size(self, page_size: usize) -> Self {
        self.behavior.lock().unwrap().page_size = page_size;
        self
    }

    /// Delay every call, for exercising in-flight dedup windows
    pub fn with_delay(self, delay: Duration) -> Self {
        self.behavior.lock().unwrap().delay = Some(delay);
        self
    }

    pub fn with_edit_access(self, can_edit: bool) -> Self {
        self.behavior.lock().unwrap().can_edit_playlists = can_edit;
        self
    }

    /// Fail the next `count` reads with the given error, then recover
    pub fn fail_next_reads(&self, count: u32, error: BackendError) {
        let mut behavior = self.behavior.lock().unwrap();
        behavior.failing_reads = count;
        behavior.read_error = error;
    }

    /// Reject every write with a structured backend error message
    pub fn reject_writes(&self, message: &str) {
        self.behavior.lock().unwrap().write_rejection = Some(message.to_string());
    }

    /// How many times `method` has been called
    pub fn calls(&self, method: &str) -> u32 {
        *self.calls.lock().unwrap().get(method).unwrap_or(&0)
    }

    fn record(&self, method: &'static str) {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
    }

    async fn before_read(&self, method: &'static str) -> Result<()> {
        self.record(method);

        let (delay, failure) = {
            let mut behavior = self.behavior.lock().unwrap();
            let failure = if behavior.failing_reads > 0 {
                behavior.failing_reads -= 1;
                Some(behavior.read_error.clone())
            } else {
                None
            };
            (behavior.delay, failure)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    async fn before_write(&self, method: &'static str) -> MutationResult<()> {
        self.record(method);

        let (delay, rejection) = {
            let behavior = self.behavior.lock().unwrap();
            (behavior.delay, behavior.write_rejection.clone())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match rejection {
            Some(message) => Err(MutationRejection::Backend(BackendError::new(409, message))),
            None => Ok(()),
        }
    }

    fn page<T: Clone>(&self, items: &[T], page: u32) -> Paged<T> {
        let page_size = self.behavior.lock().unwrap().page_size;
        let total_pages = items.len().div_ceil(page_size) as u32;
        let start = (page.saturating_sub(1) as usize) * page_size;
        let data = items
            .iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();

        Paged {
            data,
            pagination: Pagination {
                current_page: page,
                total_pages,
            },
        }
    }

    fn next_entry_id(items: &[PlaylistItem]) -> EntryId {
        EntryId(items.iter().map(|i| i.id.0).max().unwrap_or(0) + 1)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn search(
        &self,
        _locale: &Locale,
        kind: MediaKind,
        query: &str,
        _filters: &SearchFilters,
        page: u32,
    ) -> Result<Paged<MediaSummary>> {
        self.before_read("search").await?;
        let query = query.to_lowercase();
        let matches: Vec<MediaSummary> = {
            let data = self.data.lock().unwrap();
            data.search_results
                .iter()
                .filter(|m| m.kind == kind && m.title.to_lowercase().contains(&query))
                .cloned()
                .collect()
        };
        Ok(self.page(&matches, page))
    }

    async fn watchlist(&self, _user: &UserId, page: u32) -> Result<Paged<WatchlistEntry>> {
        self.before_read("watchlist").await?;
        let items = self.data.lock().unwrap().watchlist.clone();
        Ok(self.page(&items, page))
    }

    async fn recos(&self, _user: &UserId, page: u32) -> Result<Paged<Reco>> {
        self.before_read("recos").await?;
        let items = self.data.lock().unwrap().recos.clone();
        Ok(self.page(&items, page))
    }

    async fn reco_targets(
        &self,
        _user: &UserId,
        _media: MediaId,
        page: u32,
    ) -> Result<Paged<RecoTarget>> {
        self.before_read("reco_targets").await?;
        let items = self.data.lock().unwrap().reco_targets.clone();
        Ok(self.page(&items, page))
    }

    async fn playlists(&self, _user: &UserId, page: u32) -> Result<Paged<Playlist>> {
        self.before_read("playlists").await?;
        let items = self.data.lock().unwrap().playlists.clone();
        Ok(self.page(&items, page))
    }

    async fn playlist_items(
        &self,
        playlist: PlaylistId,
        page: u32,
    ) -> Result<Paged<PlaylistItem>> {
        self.before_read("playlist_items").await?;
        let items: Vec<PlaylistItem> = {
            let data = self.data.lock().unwrap();
            data.playlist_items
                .iter()
                .filter(|i| i.playlist_id == playlist)
                .cloned()
                .collect()
        };
        Ok(self.page(&items, page))
    }

    async fn playlist_guests(&self, _playlist: PlaylistId, page: u32) -> Result<Paged<Profile>> {
        self.before_read("playlist_guests").await?;
        let items = self.data.lock().unwrap().playlist_guests.clone();
        Ok(self.page(&items, page))
    }

    async fn following(&self, _user: &UserId, page: u32) -> Result<Paged<Profile>> {
        self.before_read("following").await?;
        let items = self.data.lock().unwrap().following.clone();
        Ok(self.page(&items, page))
    }

    async fn profile(&self, user: &UserId) -> Result<Profile> {
        self.before_read("profile").await?;
        let data = self.data.lock().unwrap();
        data.profiles
            .get(user)
            .cloned()
            .ok_or_else(|| BackendError::new(404, format!("no profile for {user}")).into())
    }

    async fn watchlist_count(&self, _user: &UserId) -> Result<u64> {
        self.before_read("watchlist_count").await?;
        Ok(self.data.lock().unwrap().watchlist.len() as u64)
    }

    async fn can_edit_playlist(&self, _user: &UserId, _playlist: PlaylistId) -> Result<bool> {
        self.before_read("can_edit_playlist").await?;
        Ok(self.behavior.lock().unwrap().can_edit_playlists)
    }

    async fn delete_watchlist_entry(&self, _user: &UserId, entry: EntryId) -> MutationResult<()> {
        self.before_write("delete_watchlist_entry").await?;
        let mut data = self.data.lock().unwrap();
        let before = data.watchlist.len();
        data.watchlist.retain(|e| e.id != entry);
        if data.watchlist.len() == before {
            return Err(MutationRejection::Backend(BackendError::new(
                404,
                "watchlist entry not found",
            )));
        }
        Ok(())
    }

    async fn complete_watchlist_entry(
        &self,
        _user: &UserId,
        entry: EntryId,
    ) -> MutationResult<()> {
        self.before_write("complete_watchlist_entry").await?;
        let mut data = self.data.lock().unwrap();
        match data.watchlist.iter_mut().find(|e| e.id == entry) {
            Some(found) => {
                found.completed = true;
                Ok(())
            }
            None => Err(MutationRejection::Backend(BackendError::new(
                404,
                "watchlist entry not found",
            ))),
        }
    }

    async fn send_reco(
        &self,
        _from: &UserId,
        to: &[UserId],
        _media: MediaId,
        as_watched: bool,
    ) -> MutationResult<()> {
        self.before_write("send_reco").await?;
        let mut data = self.data.lock().unwrap();
        for target in data.reco_targets.iter_mut() {
            if to.contains(&target.user.id) {
                target.already_sent = true;
                target.as_watched = as_watched;
            }
        }
        Ok(())
    }

    async fn add_playlist_item(
        &self,
        playlist: PlaylistId,
        media: MediaId,
    ) -> MutationResult<PlaylistItem> {
        self.before_write("add_playlist_item").await?;
        let mut data = self.data.lock().unwrap();
        let item = PlaylistItem {
            id: Self::next_entry_id(&data.playlist_items),
            playlist_id: playlist,
            media: MediaSummary {
                id: media,
                kind: MediaKind::Movie,
                title: format!("media-{}", media.0),
                release_year: None,
                poster_path: None,
            },
            rank: None,
            added_by: UserId("mock".to_string()),
            created_at: chrono::Utc::now(),
        };
        data.playlist_items.push(item.clone());
        Ok(item)
    }

    async fn remove_playlist_item(
        &self,
        _playlist: PlaylistId,
        item: EntryId,
    ) -> MutationResult<()> {
        self.before_write("remove_playlist_item").await?;
        let mut data = self.data.lock().unwrap();
        let before = data.playlist_items.len();
        data.playlist_items.retain(|i| i.id != item);
        if data.playlist_items.len() == before {
            return Err(MutationRejection::Backend(BackendError::new(
                404,
                "playlist item not found",
            )));
        }
        Ok(())
    }

    async fn follow(&self, _user: &UserId, target: &UserId) -> MutationResult<()> {
        self.before_write("follow").await?;
        let mut data = self.data.lock().unwrap();
        let profile = data.profiles.get(target).cloned().unwrap_or(Profile {
            id: target.clone(),
            username: target.to_string(),
            avatar_url: None,
        });
        if !data.following.iter().any(|p| p.id == *target) {
            data.following.push(profile);
        }
        Ok(())
    }

    async fn unfollow(&self, _user: &UserId, target: &UserId) -> MutationResult<()> {
        self.before_write("unfollow").await?;
        let mut data = self.data.lock().unwrap();
        data.following.retain(|p| p.id != *target);
        Ok(())
    }
}
