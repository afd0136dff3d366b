//! Cache key construction
//!
//! Keys are ordered, hierarchical tuples: `[domain, scope, ...discriminators]`.
//! Two logically equivalent requests always serialize to the same key, and any
//! differing discriminator produces a different key. Keys form a prefix tree:
//! invalidating `[user, "watchlist"]` covers the list, count and any other
//! suffixed keys.

use crate::types::{Locale, MediaId, MediaKind, PlaylistId, SearchFilters, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One segment of a cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Text(String),
    Num(u64),
    /// Canonical serialization of a filter struct
    Filters(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Text(s) => write!(f, "{s}"),
            Segment::Num(n) => write!(f, "#{n}"),
            Segment::Filters(s) => write!(f, "f:{s}"),
        }
    }
}

/// Structured cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey(Vec<Segment>);

impl QueryKey {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn push(mut self, segment: Segment) -> Self {
        self.0.push(segment);
        self
    }

    /// Whether `prefix` is a prefix of this key (prefix invalidation test)
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// Stable string form, used for logging
    pub fn canonical(&self) -> String {
        self.0
            .iter()
            .map(Segment::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

fn text(s: impl Into<String>) -> Segment {
    Segment::Text(s.into())
}

/// Canonical filter serialization
///
/// `SearchFilters` is a struct with a fixed field order, so serde_json output
/// is deterministic for equal contents no matter how the values were supplied.
fn filters_segment(filters: &SearchFilters) -> Segment {
    // Serializing Option fields of a plain struct cannot fail
    let canonical = serde_json::to_string(filters).unwrap_or_default();
    Segment::Filters(canonical)
}

/// Key for a localized media search: `[search, locale, kind, query, filters]`
pub fn search_key(
    locale: &Locale,
    kind: MediaKind,
    query: &str,
    filters: &SearchFilters,
) -> QueryKey {
    QueryKey::new(vec![
        text("search"),
        text(locale.as_str()),
        text(kind.as_str()),
        text(query),
        filters_segment(filters),
    ])
}

/// Key for a user's watchlist: `[user, watchlist]`
pub fn watchlist_key(user: &UserId) -> QueryKey {
    QueryKey::new(vec![text(user.as_str()), text("watchlist")])
}

/// Key for the watchlist aggregate count: `[user, watchlist, count]`
///
/// Suffix of [`watchlist_key`] so the same prefix invalidation covers both.
pub fn watchlist_count_key(user: &UserId) -> QueryKey {
    watchlist_key(user).push(text("count"))
}

/// Key for recommendations received by a user: `[user, recos]`
pub fn recos_key(user: &UserId) -> QueryKey {
    QueryKey::new(vec![text(user.as_str()), text("recos")])
}

/// Key for the friends a media can be recommended to: `[user, recos, targets, media]`
pub fn reco_targets_key(user: &UserId, media: MediaId) -> QueryKey {
    recos_key(user)
        .push(text("targets"))
        .push(Segment::Num(media.0))
}

/// Key for a user's playlists: `[user, playlists]`
pub fn playlists_key(user: &UserId) -> QueryKey {
    QueryKey::new(vec![text(user.as_str()), text("playlists")])
}

/// Key for the items of one playlist: `[playlist, items, id]`
///
/// This is the canonical collection key the realtime engine patches.
pub fn playlist_items_key(playlist: PlaylistId) -> QueryKey {
    QueryKey::new(vec![
        text("playlist"),
        text("items"),
        Segment::Num(playlist.0),
    ])
}

/// Key for the guests invited to a playlist: `[playlist, guests, id]`
pub fn playlist_guests_key(playlist: PlaylistId) -> QueryKey {
    QueryKey::new(vec![
        text("playlist"),
        text("guests"),
        Segment::Num(playlist.0),
    ])
}

/// Key for a public profile: `[profile, user]`
pub fn profile_key(user: &UserId) -> QueryKey {
    QueryKey::new(vec![text("profile"), text(user.as_str())])
}

/// Key for the users a user follows: `[user, following]`
pub fn following_key(user: &UserId) -> QueryKey {
    QueryKey::new(vec![text(user.as_str()), text("following")])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale() -> Locale {
        Locale("en-US".to_string())
    }

    #[test]
    fn test_equal_inputs_produce_equal_keys() {
        let a = search_key(&locale(), MediaKind::Movie, "dune", &SearchFilters::none());
        let b = search_key(&locale(), MediaKind::Movie, "dune", &SearchFilters::none());
        assert_eq!(a, b);
    }

    #[test]
    fn test_filters_equal_regardless_of_input_order() {
        // Same content supplied in different JSON key order deserializes to
        // the same struct and therefore the same key
        let first: SearchFilters =
            serde_json::from_str(r#"{"genre":"drama","release_year":1999}"#).unwrap();
        let second: SearchFilters =
            serde_json::from_str(r#"{"release_year":1999,"genre":"drama"}"#).unwrap();

        let a = search_key(&locale(), MediaKind::Movie, "dune", &first);
        let b = search_key(&locale(), MediaKind::Movie, "dune", &second);
        assert_eq!(a, b);
    }

    #[test]
    fn test_any_differing_discriminator_changes_key() {
        let base = search_key(&locale(), MediaKind::Movie, "dune", &SearchFilters::none());

        let other_locale = search_key(
            &Locale("fr-FR".to_string()),
            MediaKind::Movie,
            "dune",
            &SearchFilters::none(),
        );
        let other_kind = search_key(&locale(), MediaKind::Tv, "dune", &SearchFilters::none());
        let other_query = search_key(&locale(), MediaKind::Movie, "dune 2", &SearchFilters::none());
        let other_filters = search_key(
            &locale(),
            MediaKind::Movie,
            "dune",
            &SearchFilters {
                genre: Some("sci-fi".to_string()),
                ..SearchFilters::none()
            },
        );

        assert_ne!(base, other_locale);
        assert_ne!(base, other_kind);
        assert_ne!(base, other_query);
        assert_ne!(base, other_filters);
    }

    #[test]
    fn test_no_filter_sentinel_has_fixed_arity() {
        let without = search_key(&locale(), MediaKind::Movie, "dune", &SearchFilters::none());
        let with = search_key(
            &locale(),
            MediaKind::Movie,
            "dune",
            &SearchFilters {
                release_year: Some(2021),
                ..SearchFilters::none()
            },
        );
        assert_eq!(without.segments().len(), with.segments().len());
    }

    #[test]
    fn test_prefix_invalidation_covers_suffixed_keys() {
        let user = UserId("u-1".to_string());
        let prefix = watchlist_key(&user);

        assert!(watchlist_key(&user).starts_with(&prefix));
        assert!(watchlist_count_key(&user).starts_with(&prefix));
        assert!(!recos_key(&user).starts_with(&prefix));
    }

    #[test]
    fn test_different_users_never_share_a_prefix() {
        let a = watchlist_key(&UserId("u-1".to_string()));
        let b = watchlist_key(&UserId("u-2".to_string()));
        assert!(!a.starts_with(&b));
        assert!(!b.starts_with(&a));
    }

    #[test]
    fn test_numeric_and_text_segments_do_not_collide() {
        let by_num = QueryKey::new(vec![Segment::Text("playlist".into()), Segment::Num(1)]);
        let by_text = QueryKey::new(vec![
            Segment::Text("playlist".into()),
            Segment::Text("1".into()),
        ]);
        assert_ne!(by_num, by_text);
    }

    #[test]
    fn test_canonical_is_stable() {
        let key = playlist_items_key(PlaylistId(9));
        assert_eq!(key.canonical(), "playlist/items/#9");
    }
}
