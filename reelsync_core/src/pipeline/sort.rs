//! User-selectable sort for in-memory collections
//!
//! Comparators are total orders; the underlying `sort_by` is stable, so
//! ties keep their pre-sort (fetch) order. Items missing the sort field
//! always sort after items that have it, in both directions.

use crate::types::{PlaylistItem, WatchlistEntry};
use std::cmp::Ordering;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// A sortable field of a collection item
pub trait SortField<T>: Send + Sync {
    fn label(&self) -> &'static str;
    fn default_order(&self) -> SortOrder;
    /// Total-order comparator; direction is applied to present values only,
    /// missing values stay last either way
    fn compare(&self, a: &T, b: &T, order: SortOrder) -> Ordering;
}

/// Compare optional sort fields with the null-last policy
///
/// Missing values sort after present ones regardless of direction.
pub fn compare_optional<U: Ord>(a: Option<&U>, b: Option<&U>, order: SortOrder) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => order.apply(a.cmp(b)),
    }
}

/// Stable in-place sort by the given field and direction
pub fn sort_collection<T>(items: &mut [T], field: &dyn SortField<T>, order: SortOrder) {
    items.sort_by(|a, b| field.compare(a, b, order));
}

// Watchlist sort fields

/// Sort watchlist entries by media title
pub struct ByTitle;

impl SortField<WatchlistEntry> for ByTitle {
    fn label(&self) -> &'static str {
        "Title"
    }

    fn default_order(&self) -> SortOrder {
        SortOrder::Asc
    }

    fn compare(&self, a: &WatchlistEntry, b: &WatchlistEntry, order: SortOrder) -> Ordering {
        order.apply(
            a.media
                .title
                .to_lowercase()
                .cmp(&b.media.title.to_lowercase()),
        )
    }
}

/// Sort watchlist entries by when they were added
pub struct ByCreatedAt;

impl SortField<WatchlistEntry> for ByCreatedAt {
    fn label(&self) -> &'static str {
        "Date added"
    }

    fn default_order(&self) -> SortOrder {
        SortOrder::Desc
    }

    fn compare(&self, a: &WatchlistEntry, b: &WatchlistEntry, order: SortOrder) -> Ordering {
        order.apply(a.created_at.cmp(&b.created_at))
    }
}

/// Sort watchlist entries by release year; unreleased/unknown years last
pub struct ByReleaseYear;

impl SortField<WatchlistEntry> for ByReleaseYear {
    fn label(&self) -> &'static str {
        "Release year"
    }

    fn default_order(&self) -> SortOrder {
        SortOrder::Desc
    }

    fn compare(&self, a: &WatchlistEntry, b: &WatchlistEntry, order: SortOrder) -> Ordering {
        compare_optional(
            a.media.release_year.as_ref(),
            b.media.release_year.as_ref(),
            order,
        )
    }
}

/// Sort playlist items by their explicit rank; unranked items last
pub struct ByRank;

impl SortField<PlaylistItem> for ByRank {
    fn label(&self) -> &'static str {
        "Rank"
    }

    fn default_order(&self) -> SortOrder {
        SortOrder::Asc
    }

    fn compare(&self, a: &PlaylistItem, b: &PlaylistItem, order: SortOrder) -> Ordering {
        compare_optional(a.rank.as_ref(), b.rank.as_ref(), order)
    }
}
