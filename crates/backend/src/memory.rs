//! In-memory roster backend.
//!
//! Implements both endpoint traits over a roster held in memory, with the
//! same observable contract the remote endpoints promise: idempotent
//! search, stable totals for a fixed filter set, idempotent favorite
//! writes. Latency and failure injection make it a usable stand-in for
//! scheduler and coordinator tests as well as the demo CLI.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use tracing::debug;

use model::{
    FilterSet, PageResult, PaginationInfo, PlayerId, PlayerResult, Result, SearchError,
    SortDirection, SortField,
};

use crate::{FavoriteBackend, SearchBackend};

/// Roster-backed implementation of the search and favorite endpoints.
pub struct InMemoryBackend {
    roster: RwLock<Vec<PlayerResult>>,
    latency: Duration,
    fail_next_searches: Mutex<u32>,
    fail_next_favorites: Mutex<u32>,
    search_calls: AtomicUsize,
    favorite_calls: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new(roster: Vec<PlayerResult>) -> Self {
        Self {
            roster: RwLock::new(roster),
            latency: Duration::ZERO,
            fail_next_searches: Mutex::new(0),
            fail_next_favorites: Mutex::new(0),
            search_calls: AtomicUsize::new(0),
            favorite_calls: AtomicUsize::new(0),
        }
    }

    /// Simulate transport latency on every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the next `n` search calls fail with a backend error.
    pub fn fail_next_searches(&self, n: u32) {
        *self.fail_next_searches.lock() = n;
    }

    /// Make the next `n` favorite calls fail with a backend error.
    pub fn fail_next_favorites(&self, n: u32) {
        *self.fail_next_favorites.lock() = n;
    }

    /// Number of search requests served (including failed ones).
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(AtomicOrdering::SeqCst)
    }

    /// Number of favorite mutations received (including failed ones).
    pub fn favorite_calls(&self) -> usize {
        self.favorite_calls.load(AtomicOrdering::SeqCst)
    }

    /// Authoritative favorite flag for a player, if known.
    pub fn favorited(&self, player_id: PlayerId) -> Option<bool> {
        self.roster
            .read()
            .iter()
            .find(|p| p.id == player_id)
            .map(|p| p.is_favorited)
    }

    fn take_injected_failure(counter: &Mutex<u32>) -> bool {
        let mut remaining = counter.lock();
        if *remaining > 0 {
            *remaining -= 1;
            true
        } else {
            false
        }
    }
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    async fn search(&self, filters: &FilterSet, page: u32, page_size: u32) -> Result<PageResult> {
        self.search_calls.fetch_add(1, AtomicOrdering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if Self::take_injected_failure(&self.fail_next_searches) {
            return Err(SearchError::Backend {
                message: "injected search failure".to_string(),
            });
        }

        let roster = self.roster.read();
        let mut matched: Vec<PlayerResult> = roster
            .par_iter()
            .filter(|p| matches_filters(p, filters))
            .cloned()
            .collect();
        drop(roster);

        sort_results(&mut matched, filters);

        let total_count = matched.len() as u64;
        // Pages are 1-indexed by contract; treat 0 as the first page
        let start = (page.max(1) as usize - 1).saturating_mul(page_size as usize);
        let items: Vec<PlayerResult> = matched
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();

        debug!(
            page,
            page_size,
            total_count,
            returned = items.len(),
            "in-memory search served"
        );

        Ok(PageResult {
            items,
            pagination: PaginationInfo::derive(page, page_size, total_count),
        })
    }
}

#[async_trait]
impl FavoriteBackend for InMemoryBackend {
    async fn set_favorite(&self, player_id: PlayerId, favorited: bool) -> Result<()> {
        self.favorite_calls.fetch_add(1, AtomicOrdering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if Self::take_injected_failure(&self.fail_next_favorites) {
            return Err(SearchError::Favorite {
                player_id,
                message: "injected favorite failure".to_string(),
            });
        }

        let mut roster = self.roster.write();
        match roster.iter_mut().find(|p| p.id == player_id) {
            Some(player) => {
                // Idempotent: re-favoriting is an acknowledged no-op
                player.is_favorited = favorited;
                Ok(())
            }
            None => Err(SearchError::Favorite {
                player_id,
                message: "unknown player".to_string(),
            }),
        }
    }
}

fn matches_filters(player: &PlayerResult, filters: &FilterSet) -> bool {
    if !filters.search.is_empty() && match_score(player, &filters.search).is_none() {
        return false;
    }
    if !filters.class_years.is_empty() && !filters.class_years.contains(&player.class_year) {
        return false;
    }
    if let Some(min) = filters.gpa_min {
        if player.gpa < min {
            return false;
        }
    }
    if let Some(max) = filters.gpa_max {
        if player.gpa > max {
            return false;
        }
    }
    if !filters.school_types.is_empty() && !filters.school_types.contains(&player.school_type) {
        return false;
    }
    if let Some(game) = &filters.game {
        if !player.profiles.iter().any(|p| &p.game == game) {
            return false;
        }
    }
    if let Some(role) = &filters.role {
        if !player.profiles.iter().any(|p| &p.role == role) {
            return false;
        }
    }
    if let Some(style) = &filters.play_style {
        if !player.profiles.iter().any(|p| &p.play_style == style) {
            return false;
        }
    }
    if !filters.location.is_empty()
        && !player
            .location
            .to_lowercase()
            .contains(&filters.location.to_lowercase())
    {
        return false;
    }
    if filters.favorited_only && !player.is_favorited {
        return false;
    }
    true
}

/// Relevance score for the free-text term: exact gamertag match ranks
/// above a prefix match, which ranks above any other substring hit in the
/// gamertag or real name. `None` means no match.
fn match_score(player: &PlayerResult, search: &str) -> Option<u32> {
    let term = search.to_lowercase();
    let gamertag = player.gamertag.to_lowercase();
    let real_name = player.real_name.to_lowercase();

    if gamertag == term {
        Some(0)
    } else if gamertag.starts_with(&term) {
        Some(1)
    } else if gamertag.contains(&term) {
        Some(2)
    } else if real_name.contains(&term) {
        Some(3)
    } else {
        None
    }
}

fn sort_results(results: &mut [PlayerResult], filters: &FilterSet) {
    let compare = |a: &PlayerResult, b: &PlayerResult| -> Ordering {
        let ordering = match filters.sort_field {
            SortField::Relevance => match_score(a, &filters.search)
                .cmp(&match_score(b, &filters.search))
                .then_with(|| a.gamertag.cmp(&b.gamertag)),
            SortField::Gamertag => a.gamertag.cmp(&b.gamertag),
            SortField::Gpa => a
                .gpa
                .partial_cmp(&b.gpa)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.gamertag.cmp(&b.gamertag)),
            SortField::ClassYear => a
                .class_year
                .cmp(&b.class_year)
                .then_with(|| a.gamertag.cmp(&b.gamertag)),
        };
        match filters.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    };
    results.sort_by(compare);
}
