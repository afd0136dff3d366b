//! Tests for the paginated media search factory.
//!
//! These live as integration tests (rather than a unit-test module in
//! `queries::search`) because `MockBackend` from the test-utils crate
//! implements the `Backend` trait of the library build; a unit-test
//! module would see a second, incompatible copy of the trait via the
//! dev-dependency cycle.

use reelsync_core::error::{Error, PreconditionError};
use reelsync_core::queries::search::search_query;
use reelsync_core::queries::QueryOptions;
use reelsync_core::types::{Locale, MediaKind, MediaSummary, SearchFilters};
use reelsync_core::Backend;
use reelsync_test_utils::builders::media;
use reelsync_test_utils::MockBackend;
use std::sync::Arc;

fn options(query: &str) -> QueryOptions<MediaSummary> {
    let backend = MockBackend::new().with_search_results(vec![
        media(1, "Dune"),
        media(2, "Dune: Part Two"),
    ]);
    search_query(
        Arc::new(backend),
        Locale("en-US".to_string()),
        MediaKind::Movie,
        query.to_string(),
        SearchFilters::none(),
    )
}

#[test]
fn test_blank_query_is_disabled() {
    assert!(!options("").enabled);
    assert!(!options("   ").enabled);
    assert!(options("dune").enabled);
}

#[tokio::test]
async fn test_blank_query_fetch_rejects_with_precondition() {
    let opts = options("");
    let result = (opts.fetch)(1).await;

    assert!(matches!(
        result,
        Err(Error::Precondition(PreconditionError::EmptyQuery))
    ));
}

#[tokio::test]
async fn test_non_blank_query_fetches() {
    let opts = options("dune");
    let page = (opts.fetch)(1).await.unwrap();

    assert_eq!(page.pagination.current_page, 1);
    assert_eq!(page.data.len(), 2);
}

#[test]
fn test_kind_discriminates_cache_keys() {
    let backend: Arc<dyn Backend> = Arc::new(MockBackend::new());
    let movies = search_query(
        backend.clone(),
        Locale("en-US".to_string()),
        MediaKind::Movie,
        "dune".to_string(),
        SearchFilters::none(),
    );
    let people = search_query(
        backend,
        Locale("en-US".to_string()),
        MediaKind::Person,
        "dune".to_string(),
        SearchFilters::none(),
    );

    assert_ne!(movies.key, people.key);
}
