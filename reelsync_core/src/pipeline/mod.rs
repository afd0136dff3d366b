//! Client-side search/sort pipeline
//!
//! Two independent, composable stages applied to an already-fetched
//! collection held in memory. The fixed stage order is search first, then
//! sort: changing the sort never re-runs scoring, and a new query re-scores
//! from the unsorted base collection before the active sort is reapplied.

pub mod fuzzy;
pub mod sort;

pub use fuzzy::{fuzzy_search, FuzzyOptions, SearchKey};
pub use sort::{sort_collection, SortField, SortOrder};

/// Apply search then sort in the fixed stage order
pub fn search_then_sort<T: Clone>(
    items: &[T],
    query: &str,
    keys: &[SearchKey<T>],
    fuzzy: &FuzzyOptions,
    sort: Option<(&dyn SortField<T>, SortOrder)>,
) -> Vec<T> {
    let mut result = fuzzy_search(items, query, keys, fuzzy);
    if let Some((field, order)) = sort {
        sort_collection(&mut result, field, order);
    }
    result
}
