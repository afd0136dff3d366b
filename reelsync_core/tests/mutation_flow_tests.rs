//! Integration tests for the ack-then-invalidate mutation flow

use reelsync_core::cache::{CacheStore, EntryState, RetryPolicy};
use reelsync_core::key::{playlist_items_key, playlists_key, reco_targets_key, watchlist_key};
use reelsync_core::mutation::MutationRunner;
use reelsync_core::pagination::InfiniteQuery;
use reelsync_core::queries::recos::send_reco;
use reelsync_core::queries::playlists;
use reelsync_core::queries::watchlist::{delete_entry, watchlist_query};
use reelsync_core::types::{EntryId, MediaId, PlaylistId, UserId};
use reelsync_test_utils::builders::{profile, reco_target, watchlist_entry};
use reelsync_test_utils::{MockBackend, RecordingNotifier, StaticCatalog};
use std::sync::Arc;

fn user() -> UserId {
    UserId("u-1".to_string())
}

fn harness() -> (MutationRunner, Arc<RecordingNotifier>, CacheStore) {
    let cache = CacheStore::new();
    let notifier = Arc::new(RecordingNotifier::new());
    let catalog = Arc::new(
        StaticCatalog::new()
            .with("watchlist.deleted", "Removed from watchlist")
            .with("errors.title", "Something went wrong")
            .with("errors.generic", "An error occurred"),
    );
    let runner = MutationRunner::new(cache.clone(), notifier.clone(), catalog);
    (runner, notifier, cache)
}

#[tokio::test]
async fn test_delete_invalidates_and_next_read_refetches() {
    let backend = MockBackend::new().with_watchlist(vec![
        watchlist_entry(1, "Arrival"),
        watchlist_entry(2, "Dune"),
        watchlist_entry(3, "Her"),
    ]);
    let (runner, _notifier, cache) = harness();

    let options = watchlist_query(Arc::new(backend.clone()), user());
    let query = InfiniteQuery::new(options, cache.clone(), RetryPolicy::none());
    query.fetch_next().await.unwrap();
    assert_eq!(query.items().await.unwrap().len(), 3);
    assert_eq!(backend.calls("watchlist"), 1);

    let outcome = delete_entry(
        &runner,
        Arc::new(backend.clone()),
        &user(),
        Some(EntryId(2)),
    )
    .await
    .unwrap();
    assert!(!outcome.is_skipped());
    assert_eq!(cache.state(&watchlist_key(&user())).await, EntryState::Stale);

    // The next read refetches and observes the post-delete collection
    let items = query.items().await.unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|e| e.id != EntryId(2)));
    assert_eq!(backend.calls("watchlist"), 2);
}

#[tokio::test]
async fn test_guard_clause_sends_nothing() {
    let backend = MockBackend::new().with_watchlist(vec![watchlist_entry(1, "Arrival")]);
    let (runner, notifier, _cache) = harness();

    let outcome = delete_entry(&runner, Arc::new(backend.clone()), &user(), None)
        .await
        .unwrap();

    assert!(outcome.is_skipped());
    assert_eq!(backend.calls("delete_watchlist_entry"), 0);
    assert!(notifier.successes().is_empty());
    assert!(notifier.errors().is_empty());
}

#[tokio::test]
async fn test_success_toast_uses_catalog_message() {
    let backend = MockBackend::new().with_watchlist(vec![watchlist_entry(1, "Arrival")]);
    let (runner, notifier, _cache) = harness();

    delete_entry(&runner, Arc::new(backend), &user(), Some(EntryId(1)))
        .await
        .unwrap();

    let successes = notifier.successes();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].0, "Removed from watchlist");
}

#[tokio::test]
async fn test_rejected_write_shows_backend_message_and_keeps_cache_fresh() {
    let backend = MockBackend::new().with_watchlist(vec![watchlist_entry(1, "Arrival")]);
    backend.reject_writes("watchlist is locked");
    let (runner, notifier, cache) = harness();

    let key = watchlist_key(&user());
    cache.put(&key, &vec![1u32]).await.unwrap();

    let result = delete_entry(&runner, Arc::new(backend), &user(), Some(EntryId(1))).await;

    assert!(result.is_err());
    let errors = notifier.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "Something went wrong");
    assert_eq!(errors[0].1.as_deref(), Some("watchlist is locked"));

    // Failed writes must not invalidate anything
    assert_eq!(cache.state(&key).await, EntryState::Fresh);
}

#[tokio::test]
async fn test_add_playlist_item_invalidates_items_and_playlists() {
    let backend = MockBackend::new();
    let (runner, _notifier, cache) = harness();
    let playlist = PlaylistId(1);

    let items_key = playlist_items_key(playlist);
    let lists_key = playlists_key(&user());
    cache.put(&items_key, &Vec::<u32>::new()).await.unwrap();
    cache.put(&lists_key, &Vec::<u32>::new()).await.unwrap();

    let outcome = playlists::add_item(
        &runner,
        Arc::new(backend),
        &user(),
        playlist,
        Some(MediaId(550)),
    )
    .await
    .unwrap();

    assert!(!outcome.is_skipped());
    assert_eq!(cache.state(&items_key).await, EntryState::Stale);
    assert_eq!(cache.state(&lists_key).await, EntryState::Stale);
}

#[tokio::test]
async fn test_add_item_without_selection_skips() {
    let backend = MockBackend::new();
    let (runner, notifier, _cache) = harness();

    let outcome = playlists::add_item(
        &runner,
        Arc::new(backend.clone()),
        &user(),
        PlaylistId(1),
        None,
    )
    .await
    .unwrap();

    assert!(outcome.is_skipped());
    assert_eq!(backend.calls("add_playlist_item"), 0);
    assert!(notifier.successes().is_empty());
}

#[tokio::test]
async fn test_send_reco_skips_empty_selection() {
    let backend = MockBackend::new()
        .with_reco_targets(vec![reco_target(profile("u-2", "sam"), false)]);
    let (runner, _notifier, _cache) = harness();

    let outcome = send_reco(
        &runner,
        Arc::new(backend.clone()),
        &user(),
        vec![],
        MediaId(550),
        false,
    )
    .await
    .unwrap();

    assert!(outcome.is_skipped());
    assert_eq!(backend.calls("send_reco"), 0);
}

#[tokio::test]
async fn test_send_reco_invalidates_targets() {
    let backend = MockBackend::new()
        .with_reco_targets(vec![reco_target(profile("u-2", "sam"), false)]);
    let (runner, _notifier, cache) = harness();
    let media = MediaId(550);

    let targets_key = reco_targets_key(&user(), media);
    cache.put(&targets_key, &Vec::<u32>::new()).await.unwrap();

    send_reco(
        &runner,
        Arc::new(backend),
        &user(),
        vec![UserId("u-2".to_string())],
        media,
        true,
    )
    .await
    .unwrap();

    assert_eq!(cache.state(&targets_key).await, EntryState::Stale);
}

#[tokio::test]
async fn test_count_widget_goes_stale_with_the_list() {
    let backend = MockBackend::new().with_watchlist(vec![
        watchlist_entry(1, "Arrival"),
        watchlist_entry(2, "Dune"),
    ]);
    let (runner, _notifier, cache) = harness();

    // Simulate a cached count widget under the list's key prefix
    let count_key = reelsync_core::key::watchlist_count_key(&user());
    cache.put(&count_key, &2u64).await.unwrap();

    delete_entry(&runner, Arc::new(backend), &user(), Some(EntryId(1)))
        .await
        .unwrap();

    assert_eq!(cache.state(&count_key).await, EntryState::Stale);
}
