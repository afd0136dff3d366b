//! Constructors for the entity shapes used across tests
//!
//! Timestamps are derived from the numeric id so ordering by `created_at`
//! is deterministic and id order matches insertion order.

use chrono::{DateTime, TimeZone, Utc};
use reelsync_core::types::{
    EntryId, MediaId, MediaKind, MediaSummary, Paged, Pagination, Playlist, PlaylistId,
    PlaylistItem, Profile, Reco, RecoTarget, UserId, WatchlistEntry,
};

fn timestamp(id: u64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + id as i64, 0).unwrap()
}

pub fn media(id: u64, title: &str) -> MediaSummary {
    MediaSummary {
        id: MediaId(id),
        kind: MediaKind::Movie,
        title: title.to_string(),
        release_year: Some(2000 + (id % 25) as u16),
        poster_path: Some(format!("/posters/{id}.jpg")),
    }
}

pub fn profile(id: &str, username: &str) -> Profile {
    Profile {
        id: UserId(id.to_string()),
        username: username.to_string(),
        avatar_url: None,
    }
}

pub fn watchlist_entry(id: u64, title: &str) -> WatchlistEntry {
    WatchlistEntry {
        id: EntryId(id),
        media: media(id, title),
        created_at: timestamp(id),
        completed: false,
    }
}

pub fn reco(id: u64, title: &str, sender: Profile) -> Reco {
    Reco {
        id: EntryId(id),
        media: media(id, title),
        sender,
        created_at: timestamp(id),
        as_watched: false,
    }
}

pub fn reco_target(user: Profile, already_sent: bool) -> RecoTarget {
    RecoTarget {
        user,
        already_sent,
        as_watched: false,
    }
}

pub fn playlist(id: u64, name: &str, owner: &str) -> Playlist {
    Playlist {
        id: PlaylistId(id),
        name: name.to_string(),
        owner: UserId(owner.to_string()),
        created_at: timestamp(id),
    }
}

pub fn playlist_item(id: u64, playlist: u64, title: &str, rank: Option<u32>) -> PlaylistItem {
    PlaylistItem {
        id: EntryId(id),
        playlist_id: PlaylistId(playlist),
        media: media(id, title),
        rank,
        added_by: UserId("u-owner".to_string()),
        created_at: timestamp(id),
    }
}

/// Wrap items as one page of a larger result set
pub fn paged<T>(data: Vec<T>, current_page: u32, total_pages: u32) -> Paged<T> {
    Paged {
        data,
        pagination: Pagination {
            current_page,
            total_pages,
        },
    }
}
