//! Optimistic favorite toggles with shadow-state reconciliation.
//!
//! A toggle flips a local shadow boolean immediately, dispatches the
//! remote mutation in the background, and suppresses duplicate dispatch
//! per player while one is outstanding. Presentation reads
//! `shadow override, falling back to the authoritative flag`, so the UI
//! answers instantly despite network latency.
//!
//! A shadow entry is cleared by whichever happens first:
//! - reconciliation: fresh authoritative data matches the override, or
//! - the fallback timer, which bounds how long the UI may disagree with
//!   the server.
//!
//! Overrides carry a generation number and each fallback timer only
//! clears the generation it was armed for, so a timer left over from an
//! earlier toggle cannot delete the override a newer toggle installed.
//! Both clear paths are idempotent, so their race is a benign no-op in
//! either order.
//!
//! Failed mutations do NOT revert the shadow: the failure is reported on
//! the notifier and the override stands until reconciliation or the
//! fallback clears it. If product ever wants revert-on-failure, this
//! module's mutation task is the single place to change.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use backend::{FavoriteBackend, NoticeKind, Notifier};
use model::{PlayerId, PlayerResult};
use scheduler::BackgroundQueue;

/// How long a shadow override may outlive its mutation before being
/// dropped unconditionally.
pub const FAVORITE_FALLBACK: Duration = Duration::from_secs(3);

const MUTATION_QUEUE_CAPACITY: usize = 32;

/// One optimistic override, tagged with the toggle that installed it so a
/// stale fallback timer cannot clear a newer override for the same player.
struct ShadowOverride {
    value: bool,
    generation: u64,
}

#[derive(Clone)]
pub struct FavoriteCoordinator {
    favorites: Arc<dyn FavoriteBackend>,
    notifier: Arc<dyn Notifier>,
    shadow: Arc<Mutex<HashMap<PlayerId, ShadowOverride>>>,
    in_flight: Arc<Mutex<HashSet<PlayerId>>>,
    generations: Arc<AtomicU64>,
    mutations: Arc<BackgroundQueue>,
    timers: Arc<BackgroundQueue>,
    fallback: Duration,
}

impl FavoriteCoordinator {
    pub fn new(favorites: Arc<dyn FavoriteBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            favorites,
            notifier,
            shadow: Arc::new(Mutex::new(HashMap::new())),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            generations: Arc::new(AtomicU64::new(0)),
            mutations: Arc::new(BackgroundQueue::new(MUTATION_QUEUE_CAPACITY)),
            timers: Arc::new(BackgroundQueue::new(MUTATION_QUEUE_CAPACITY)),
            fallback: FAVORITE_FALLBACK,
        }
    }

    /// Toggle a player's favorite state optimistically.
    ///
    /// `last_known` is the value currently displayed (shadow override or
    /// authoritative). Returns whether a mutation was dispatched; a toggle
    /// for a player with a mutation already in flight is dropped, not
    /// queued.
    pub fn toggle(&self, player_id: PlayerId, last_known: bool) -> bool {
        if !self.in_flight.lock().insert(player_id) {
            debug!(player_id, "toggle dropped: mutation already in flight");
            return false;
        }

        let target = !last_known;
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        self.shadow.lock().insert(
            player_id,
            ShadowOverride {
                value: target,
                generation,
            },
        );

        let favorites = Arc::clone(&self.favorites);
        let notifier = Arc::clone(&self.notifier);
        let in_flight = Arc::clone(&self.in_flight);
        let dispatched = self.mutations.try_spawn(async move {
            let outcome = favorites.set_favorite(player_id, target).await;
            match outcome {
                Ok(()) => {
                    let verb = if target { "favorited" } else { "unfavorited" };
                    notifier.notify(NoticeKind::Success, &format!("Player {player_id} {verb}"));
                }
                // The shadow is intentionally left standing; see module docs.
                Err(e) => notifier.notify(NoticeKind::Error, &e.to_string()),
            }
            // Either outcome releases the player for the next toggle.
            in_flight.lock().remove(&player_id);
        });

        if !dispatched {
            // Queue saturated: undo the optimistic flip, nothing was sent.
            self.in_flight.lock().remove(&player_id);
            self.shadow.lock().remove(&player_id);
            self.notifier
                .notify(NoticeKind::Error, "Too many pending favorite updates");
            return false;
        }

        let shadow = Arc::clone(&self.shadow);
        let fallback = self.fallback;
        self.timers.try_spawn(async move {
            tokio::time::sleep(fallback).await;
            // Only clear the override this toggle installed; a newer
            // toggle's override is bounded by its own timer.
            let mut shadow = shadow.lock();
            if shadow
                .get(&player_id)
                .is_some_and(|o| o.generation == generation)
            {
                shadow.remove(&player_id);
                debug!(player_id, "fallback timer cleared shadow override");
            }
        });

        true
    }

    /// Displayed favorite value: the shadow override when present,
    /// otherwise the authoritative flag.
    pub fn effective(&self, player_id: PlayerId, authoritative: bool) -> bool {
        self.shadow
            .lock()
            .get(&player_id)
            .map(|o| o.value)
            .unwrap_or(authoritative)
    }

    /// Drop every shadow override the fresh authoritative data already
    /// agrees with. Called whenever a page of results arrives.
    pub fn reconcile(&self, items: &[PlayerResult]) {
        let mut shadow = self.shadow.lock();
        for item in items {
            if shadow.get(&item.id).is_some_and(|o| o.value == item.is_favorited) {
                shadow.remove(&item.id);
                debug!(player_id = item.id, "shadow override reconciled");
            }
        }
    }

    /// Whether a shadow override exists for the player.
    pub fn has_override(&self, player_id: PlayerId) -> bool {
        self.shadow.lock().contains_key(&player_id)
    }

    /// Whether a mutation is outstanding for the player.
    pub fn is_pending(&self, player_id: PlayerId) -> bool {
        self.in_flight.lock().contains(&player_id)
    }

    /// Wait for every dispatched mutation (not the fallback timers).
    /// Test hook.
    pub async fn quiesce(&self) {
        self.mutations.quiesce().await;
    }

    /// Wait for mutations and fallback timers alike. Test hook.
    pub async fn quiesce_all(&self) {
        self.mutations.quiesce().await;
        self.timers.quiesce().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::{InMemoryBackend, roster};
    use tokio::time::advance;

    struct CollectingNotifier {
        notices: Mutex<Vec<(NoticeKind, String)>>,
    }

    impl CollectingNotifier {
        fn new() -> Self {
            Self {
                notices: Mutex::new(Vec::new()),
            }
        }

        fn errors(&self) -> usize {
            self.notices
                .lock()
                .iter()
                .filter(|(kind, _)| *kind == NoticeKind::Error)
                .count()
        }
    }

    impl Notifier for CollectingNotifier {
        fn notify(&self, kind: NoticeKind, message: &str) {
            self.notices.lock().push((kind, message.to_string()));
        }
    }

    fn setup() -> (Arc<InMemoryBackend>, Arc<CollectingNotifier>, FavoriteCoordinator) {
        let backend = Arc::new(InMemoryBackend::new(roster::generate(20)));
        let notifier = Arc::new(CollectingNotifier::new());
        let coordinator = FavoriteCoordinator::new(backend.clone(), notifier.clone());
        (backend, notifier, coordinator)
    }

    #[tokio::test]
    async fn toggle_flips_shadow_immediately() {
        let (_backend, _notifier, favorites) = setup();

        assert!(favorites.toggle(1, false));
        // Before the mutation has resolved, the displayed value is the
        // optimistic one.
        assert!(favorites.effective(1, false));
        assert!(favorites.is_pending(1));
    }

    #[tokio::test]
    async fn duplicate_toggle_is_dropped_not_queued() {
        let (backend, _notifier, favorites) = setup();

        assert!(favorites.toggle(1, false));
        assert!(!favorites.toggle(1, true));

        favorites.quiesce().await;
        assert_eq!(backend.favorite_calls(), 1);
        assert_eq!(backend.favorited(1), Some(true));
    }

    #[tokio::test]
    async fn next_toggle_allowed_after_resolution() {
        let (backend, _notifier, favorites) = setup();

        favorites.toggle(1, false);
        favorites.quiesce().await;
        assert!(!favorites.is_pending(1));

        assert!(favorites.toggle(1, true));
        favorites.quiesce().await;
        assert_eq!(backend.favorite_calls(), 2);
        assert_eq!(backend.favorited(1), Some(false));
    }

    #[tokio::test]
    async fn reconciliation_clears_matching_overrides() {
        let (_backend, _notifier, favorites) = setup();

        favorites.toggle(1, false);
        assert!(favorites.has_override(1));

        // Authoritative data arrives agreeing with the override.
        let mut confirmed = roster::player(1);
        confirmed.is_favorited = true;
        favorites.reconcile(&[confirmed]);

        assert!(!favorites.has_override(1));
        // Displayed value falls back to authoritative with no flicker.
        assert!(favorites.effective(1, true));
    }

    #[tokio::test]
    async fn reconciliation_keeps_unconfirmed_overrides() {
        let (_backend, _notifier, favorites) = setup();

        favorites.toggle(1, false);

        // Stale authoritative data still says unfavorited.
        favorites.reconcile(&[roster::player(1)]);

        assert!(favorites.has_override(1));
        assert!(favorites.effective(1, false));
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_timer_clears_unreconciled_override() {
        let (backend, notifier, favorites) = setup();
        backend.fail_next_favorites(1);

        favorites.toggle(1, false);
        advance(FAVORITE_FALLBACK + Duration::from_millis(1)).await;
        favorites.quiesce_all().await;

        // Mutation failed, nothing reverted the shadow, but the fallback
        // bounded how long the UI could disagree with the server.
        assert!(!favorites.has_override(1));
        assert!(!favorites.effective(1, false));
        assert_eq!(notifier.errors(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_fallback_timer_spares_a_newer_override() {
        let (_backend, _notifier, favorites) = setup();

        // First toggle: resolves and reconciles, but its timer keeps
        // ticking toward t=3s.
        favorites.toggle(1, false);
        favorites.quiesce().await;
        let mut confirmed = roster::player(1);
        confirmed.is_favorited = true;
        favorites.reconcile(&[confirmed]);
        assert!(!favorites.has_override(1));

        // Second toggle two seconds later installs a fresh override.
        advance(Duration::from_secs(2)).await;
        assert!(favorites.toggle(1, true));
        assert!(favorites.has_override(1));

        // The first toggle's timer fires now; the one-second-old override
        // must survive it.
        advance(Duration::from_secs(1) + Duration::from_millis(1)).await;
        assert!(favorites.has_override(1));
        assert!(!favorites.effective(1, true));

        // The newer toggle's own timer still bounds its override.
        advance(FAVORITE_FALLBACK).await;
        favorites.quiesce_all().await;
        assert!(!favorites.has_override(1));
    }

    #[tokio::test]
    async fn failed_mutation_keeps_override_until_fallback() {
        let (backend, notifier, favorites) = setup();
        backend.fail_next_favorites(1);

        favorites.toggle(1, false);
        favorites.quiesce().await;

        assert_eq!(notifier.errors(), 1);
        // Documented limitation: no rollback on failure.
        assert!(favorites.effective(1, false));
    }
}
