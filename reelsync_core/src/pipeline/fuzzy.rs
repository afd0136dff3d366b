//! Fuzzy text search over in-memory collections
//!
//! Trigram-based approximate matching against weighted field extractors.
//! Scores are distances in `[0.0, 1.0]`: 0.0 is an exact match, and the
//! configurable threshold decides how far a candidate may be and still be
//! kept (0.0 = exact only, 1.0 = match anything). Results come back ordered
//! by ascending distance, best match first.

use std::collections::HashSet;

/// Weighted field extractor for one searchable field
pub struct SearchKey<T> {
    pub name: &'static str,
    pub weight: f64,
    pub get: fn(&T) -> Option<String>,
}

/// Search tuning
#[derive(Debug, Clone)]
pub struct FuzzyOptions {
    /// Maximum distance a candidate may have and still be kept
    pub threshold: f64,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self { threshold: 0.4 }
    }
}

/// Filter and rank `items` by approximate match against `query`
///
/// An empty (or all-whitespace) query is a pass-through: the original
/// collection comes back unfiltered and in its original order, unordered by
/// score.
pub fn fuzzy_search<T: Clone>(
    items: &[T],
    query: &str,
    keys: &[SearchKey<T>],
    options: &FuzzyOptions,
) -> Vec<T> {
    let query = query.trim();
    if query.is_empty() {
        return items.to_vec();
    }

    let query = normalize(query);
    let query_trigrams = trigrams(&query);

    let mut scored: Vec<(f64, T)> = items
        .iter()
        .filter_map(|item| {
            let distance = item_distance(item, &query, &query_trigrams, keys)?;
            if distance <= options.threshold {
                Some((distance, item.clone()))
            } else {
                None
            }
        })
        .collect();

    // Stable sort keeps input order for equal distances
    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, item)| item).collect()
}

/// Weighted distance of one item across all extractable fields
///
/// Returns `None` when no field yields a value.
fn item_distance<T>(
    item: &T,
    query: &str,
    query_trigrams: &HashSet<[char; 3]>,
    keys: &[SearchKey<T>],
) -> Option<f64> {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;

    for key in keys {
        if let Some(text) = (key.get)(item) {
            let similarity = similarity(query, query_trigrams, &normalize(&text));
            weighted += key.weight * (1.0 - similarity);
            total_weight += key.weight;
        }
    }

    if total_weight == 0.0 {
        None
    } else {
        Some(weighted / total_weight)
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Padded character trigrams, e.g. "  d", " du", "dun", "une", "ne "
fn trigrams(text: &str) -> HashSet<[char; 3]> {
    let padded: Vec<char> = std::iter::repeat(' ')
        .take(2)
        .chain(text.chars())
        .chain(std::iter::once(' '))
        .collect();

    padded.windows(3).map(|w| [w[0], w[1], w[2]]).collect()
}

/// Similarity in `[0.0, 1.0]` between the query and one field value
///
/// Jaccard overlap of trigram sets, boosted for exact and substring
/// matches so short queries rank prefixes sensibly.
fn similarity(query: &str, query_trigrams: &HashSet<[char; 3]>, text: &str) -> f64 {
    if text == query {
        return 1.0;
    }

    let text_trigrams = trigrams(text);
    let intersection = query_trigrams.intersection(&text_trigrams).count();
    let union = query_trigrams.union(&text_trigrams).count();
    let jaccard = if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    };

    if text.contains(query) {
        jaccard.max(0.8)
    } else {
        jaccard
    }
}
