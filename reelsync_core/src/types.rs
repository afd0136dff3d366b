//! Core data model shared by the query, pagination and realtime layers
//!
//! These types mirror the shapes the backend returns: paged collections,
//! media entities and the per-user collection items (watchlist entries,
//! recommendations, playlist items).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque user identifier (backend-issued UUID string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric media entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaId(pub u64);

/// Numeric playlist identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaylistId(pub u64);

/// Identifier of a row in a user collection (watchlist entry, reco, playlist item)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

/// Kind of media entity a search targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
    Person,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
            MediaKind::Person => "person",
        }
    }
}

/// BCP 47-style locale tag used to scope localized search results
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale(pub String);

impl Locale {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Page position within a paged backend response (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
}

/// One page of a paged backend response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paged<T> {
    /// Next page to request, or `None` when pagination is exhausted
    ///
    /// Exhaustion is a normal terminal state, not an error.
    pub fn next_page(&self) -> Option<u32> {
        if self.pagination.current_page < self.pagination.total_pages {
            Some(self.pagination.current_page + 1)
        } else {
            None
        }
    }
}

/// Lightweight media entity as returned by search and collection reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSummary {
    pub id: MediaId,
    pub kind: MediaKind,
    pub title: String,
    pub release_year: Option<u16>,
    pub poster_path: Option<String>,
}

/// Public profile of a user (the canonical user model)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// Entry in a user's watchlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub id: EntryId,
    pub media: MediaSummary,
    pub created_at: DateTime<Utc>,
    pub completed: bool,
}

/// A recommendation received from another user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reco {
    pub id: EntryId,
    pub media: MediaSummary,
    pub sender: Profile,
    pub created_at: DateTime<Utc>,
    pub as_watched: bool,
}

/// A friend a recommendation can be sent to, with per-media send state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoTarget {
    pub user: Profile,
    pub already_sent: bool,
    pub as_watched: bool,
}

/// A playlist owned or followed by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
}

/// Item inside a playlist; `rank` is present only for ordered playlists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: EntryId,
    pub playlist_id: PlaylistId,
    pub media: MediaSummary,
    pub rank: Option<u32>,
    pub added_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Filter set applied to media searches
///
/// Always passed in full: an unset field is the sentinel for "no filter",
/// never an omitted struct, so every search key has the same arity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub release_year: Option<u16>,
    #[serde(default)]
    pub min_rating: Option<u8>,
}

impl SearchFilters {
    /// The "no filter" sentinel
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.genre.is_none() && self.release_year.is_none() && self.min_rating.is_none()
    }
}

/// Collection items the realtime engine can locate by identity
pub trait Keyed {
    fn entry_id(&self) -> EntryId;
}

impl Keyed for WatchlistEntry {
    fn entry_id(&self) -> EntryId {
        self.id
    }
}

impl Keyed for Reco {
    fn entry_id(&self) -> EntryId {
        self.id
    }
}

impl Keyed for PlaylistItem {
    fn entry_id(&self) -> EntryId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paged(current_page: u32, total_pages: u32) -> Paged<u32> {
        Paged {
            data: vec![],
            pagination: Pagination {
                current_page,
                total_pages,
            },
        }
    }

    #[test]
    fn test_next_page_advances_until_last() {
        assert_eq!(paged(1, 3).next_page(), Some(2));
        assert_eq!(paged(2, 3).next_page(), Some(3));
        assert_eq!(paged(3, 3).next_page(), None);
    }

    #[test]
    fn test_next_page_single_page() {
        assert_eq!(paged(1, 1).next_page(), None);
    }

    #[test]
    fn test_next_page_empty_result() {
        // Backends report zero pages for empty result sets
        assert_eq!(paged(1, 0).next_page(), None);
    }

    #[test]
    fn test_media_kind_as_str() {
        assert_eq!(MediaKind::Movie.as_str(), "movie");
        assert_eq!(MediaKind::Tv.as_str(), "tv");
        assert_eq!(MediaKind::Person.as_str(), "person");
    }

    #[test]
    fn test_playlist_item_roundtrip() {
        let item = PlaylistItem {
            id: EntryId(7),
            playlist_id: PlaylistId(3),
            media: MediaSummary {
                id: MediaId(550),
                kind: MediaKind::Movie,
                title: "Fight Club".to_string(),
                release_year: Some(1999),
                poster_path: None,
            },
            rank: Some(1),
            added_by: UserId("u-1".to_string()),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&item).unwrap();
        let back: PlaylistItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
        assert_eq!(back.entry_id(), EntryId(7));
    }
}
