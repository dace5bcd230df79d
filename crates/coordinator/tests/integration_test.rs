//! Integration tests for the coordinator.
//!
//! These tests drive a full search session (debounced input, page
//! navigation, prefetching, and optimistic favorites) against the
//! in-memory backend, the way a host UI would.

use std::sync::Arc;
use std::time::Duration;

use backend::{InMemoryBackend, LogNotifier, roster};
use coordinator::{DEBOUNCE_DELAY, SearchCoordinator};
use tokio::time::advance;

fn session_over(count: usize) -> (Arc<InMemoryBackend>, SearchCoordinator) {
    let backend = Arc::new(InMemoryBackend::new(roster::generate(count)));
    let session = SearchCoordinator::new(backend.clone(), backend.clone(), Arc::new(LogNotifier));
    (backend, session)
}

#[tokio::test(start_paused = true)]
async fn warm_navigation_is_served_from_cache() {
    let (backend, mut session) = session_over(100);

    // Initial fetch warms page 1 plus prefetched pages 2-5.
    session.init().await.unwrap();
    session.quiesce().await;
    let warm = backend.search_calls();
    assert_eq!(warm, 5);

    // Walking forward through prefetched pages issues no new requests.
    for expected_page in 2..=5 {
        assert!(session.next_page().await.unwrap());
        assert_eq!(session.current_page(), expected_page);
        assert_eq!(session.players().len(), 20);
    }
    session.quiesce().await;
    assert_eq!(backend.search_calls(), warm);
}

#[tokio::test(start_paused = true)]
async fn full_session_search_navigate_and_favorite() {
    let (backend, mut session) = session_over(200);
    session.init().await.unwrap();
    session.quiesce().await;

    // Favorite the top player: the displayed flag flips before the
    // mutation resolves.
    let top = session.players()[0].id;
    assert!(session.toggle_favorite(top));
    assert!(session.players()[0].is_favorited);
    assert!(session.favorites().is_pending(top));

    session.quiesce().await;
    assert_eq!(backend.favorited(top), Some(true));
    // Confirmed remotely, but no fresh page has arrived yet, so the
    // override is still carrying the displayed value.
    assert!(session.favorites().has_override(top));

    // Type a search term; nothing fetches until the input goes quiet.
    session.set_search("ace");
    assert!(session.is_filtering());
    session.settle().await.unwrap();
    assert!(!session.is_filtering());

    let players = session.players();
    assert!(!players.is_empty());
    for player in &players {
        assert!(player.gamertag.contains("ace"));
    }

    // The fresh page of authoritative data confirms the toggle: the
    // shadow override retires without the flag flickering.
    let favorited = players.iter().find(|p| p.id == top).unwrap();
    assert!(favorited.is_favorited);
    assert!(!session.favorites().has_override(top));
}

#[tokio::test(start_paused = true)]
async fn filter_change_resets_pagination_and_refetches() {
    let (backend, mut session) = session_over(200);
    session.init().await.unwrap();
    session.quiesce().await;

    session.go_to_page(4).await.unwrap();
    session.quiesce().await;
    let before = backend.search_calls();

    // A settled filter change lands on page 1 of the new result set.
    session.set_search("nova");
    session.settle().await.unwrap();
    session.quiesce().await;

    assert_eq!(session.current_page(), 1);
    assert!(backend.search_calls() > before);

    // Clearing the search goes back to the unfiltered roster without a
    // debounce wait.
    session.set_search("");
    assert!(session.poll_settled().await.unwrap());
    assert_eq!(session.current_page(), 1);
    assert_eq!(session.pagination().unwrap().total_count, 200);
}

#[tokio::test(start_paused = true)]
async fn rapid_typing_coalesces_into_one_applied_term() {
    let (_backend, mut session) = session_over(100);
    session.init().await.unwrap();

    // Keystrokes 80ms apart never let the timer fire.
    for term in ["a", "ac", "ace", "acep", "acepl"] {
        session.set_search(term);
        advance(Duration::from_millis(80)).await;
    }
    assert!(session.is_filtering());
    assert!(!session.poll_settled().await.unwrap());

    // The final keystroke settles one full delay after it was typed.
    advance(DEBOUNCE_DELAY).await;
    // `advance` wakes the debounce timer but does not guarantee the task
    // runs before returning; yield so the publish lands before polling.
    tokio::task::yield_now().await;
    assert!(session.poll_settled().await.unwrap());
    assert!(!session.is_filtering());
    for player in session.players() {
        assert!(player.gamertag.contains("acepl"));
    }
}

#[tokio::test(start_paused = true)]
async fn transient_backend_failure_recovers_on_retry() {
    let (backend, mut session) = session_over(100);
    session.init().await.unwrap();
    session.quiesce().await;
    let page_one = session.players();

    backend.fail_next_searches(1);
    session.set_search("nova");
    session.settle().await.unwrap();

    // The failed fetch surfaces an error while the stale page stays up.
    assert!(session.error().is_some());
    assert_eq!(session.players(), page_one);

    session.refresh().await.unwrap();
    assert!(session.error().is_none());
    for player in session.players() {
        assert!(player.gamertag.contains("nova"));
    }
}
