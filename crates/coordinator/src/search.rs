//! Search state coordination.
//!
//! The [`SearchCoordinator`] composes the debouncer and the query
//! scheduler: it holds the live (un-debounced) filter object for instant
//! input echo, derives the debounced filter object that actually drives
//! fetches, resets the page to 1 whenever the settled filters change, and
//! exposes the read surface the presentation layer renders from
//! (`players`, `page_window`, `is_filtering`, `is_loading`, `error`).
//!
//! Typing is never blocked by network activity: `set_filters` is
//! synchronous, and fetching happens when the debounced value settles.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use backend::{FavoriteBackend, Notifier, SearchBackend};
use model::{FilterSet, PageRequest, PageResult, PaginationInfo, PlayerId, PlayerResult, Result};
use paging::PageWindow;
use scheduler::QueryScheduler;

use crate::debounce::Debouncer;
use crate::favorites::FavoriteCoordinator;

/// How long filter input must be quiet before a fetch is issued.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(400);

/// Non-empty search terms shorter than this do not fetch; an empty term
/// always searches.
pub const MIN_SEARCH_LEN: usize = 2;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

pub struct SearchCoordinator {
    scheduler: QueryScheduler,
    favorites: FavoriteCoordinator,
    live: FilterSet,
    debouncer: Debouncer<FilterSet>,
    debounced: watch::Receiver<FilterSet>,
    /// Last settled filter set a fetch decision was made for
    applied: FilterSet,
    page: u32,
    page_size: u32,
    result: Option<PageResult>,
    error: Option<String>,
    loading: bool,
}

impl SearchCoordinator {
    pub fn new(
        search: Arc<dyn SearchBackend>,
        favorites: Arc<dyn FavoriteBackend>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_page_size(search, favorites, notifier, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(
        search: Arc<dyn SearchBackend>,
        favorites: Arc<dyn FavoriteBackend>,
        notifier: Arc<dyn Notifier>,
        page_size: u32,
    ) -> Self {
        let filters = FilterSet::new();
        let debouncer = Debouncer::new(filters.clone(), DEBOUNCE_DELAY);
        let debounced = debouncer.subscribe();
        Self {
            scheduler: QueryScheduler::new(search),
            favorites: FavoriteCoordinator::new(favorites, notifier),
            live: filters.clone(),
            debouncer,
            debounced,
            applied: filters,
            page: 1,
            page_size,
            result: None,
            error: None,
            loading: false,
        }
    }

    /// Issue the initial fetch for the default (empty) filter set.
    pub async fn init(&mut self) -> Result<()> {
        self.refresh().await
    }

    // =========================================================================
    // Filter input
    // =========================================================================

    /// Record new live filters. Synchronous: the caller's input echo reads
    /// `live_filters` back immediately while the debounce timer runs.
    ///
    /// An empty search string bypasses the timer so clearing the search
    /// box never feels delayed; everything else settles after
    /// [`DEBOUNCE_DELAY`].
    pub fn set_filters(&mut self, filters: FilterSet) {
        self.live = filters.clone();
        if filters.search.is_empty() {
            self.debouncer.set_immediate(filters);
        } else {
            self.debouncer.set(filters);
        }
    }

    /// Convenience for the common case: only the search term changed.
    pub fn set_search(&mut self, search: impl Into<String>) {
        let filters = self.live.clone().with_search(search);
        self.set_filters(filters);
    }

    /// True while the live filters have not yet settled; the host UI's
    /// "typing..." indicator.
    pub fn is_filtering(&self) -> bool {
        self.live != *self.debounced.borrow()
    }

    /// Wait for the next settled filter value and act on it: reset to
    /// page 1 if the filters actually changed, then fetch (subject to the
    /// minimum search-term gate).
    pub async fn settle(&mut self) -> Result<()> {
        if self.debounced.changed().await.is_err() {
            return Ok(());
        }
        let settled = self.debounced.borrow_and_update().clone();
        self.apply_settled(settled).await
    }

    /// Non-blocking variant of [`settle`](Self::settle): applies a pending
    /// settled value if there is one. Returns whether anything was applied.
    pub async fn poll_settled(&mut self) -> Result<bool> {
        if !self.debounced.has_changed().unwrap_or(false) {
            return Ok(false);
        }
        let settled = self.debounced.borrow_and_update().clone();
        self.apply_settled(settled).await?;
        Ok(true)
    }

    async fn apply_settled(&mut self, settled: FilterSet) -> Result<()> {
        if settled != self.applied {
            // The only page-reset site: a settled filter change starts the
            // result set over from page 1. Manual navigation never comes
            // through here.
            debug!("settled filters changed, resetting to page 1");
            self.applied = settled;
            self.page = 1;
        }
        self.refresh().await
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Fetch the current `(filters, page)` pair. Errors are retained for
    /// display while the previous results stay visible; calling this again
    /// retries the same request.
    pub async fn refresh(&mut self) -> Result<()> {
        let search_len = self.applied.search.chars().count();
        if search_len > 0 && search_len < MIN_SEARCH_LEN {
            debug!(search_len, "search term below minimum length, not fetching");
            self.loading = false;
            return Ok(());
        }

        let request = PageRequest::new(self.applied.clone(), self.page, self.page_size);
        self.loading = true;
        match self.scheduler.schedule(&request).await {
            Ok(result) => {
                info!(
                    page = self.page,
                    total = result.pagination.total_count,
                    "page resolved"
                );
                self.favorites.reconcile(&result.items);
                self.result = Some(result);
                self.error = None;
            }
            Err(e) => {
                // Previously-fetched results remain visible; no blanking.
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
        Ok(())
    }

    // =========================================================================
    // Page navigation
    // =========================================================================

    /// Navigate to a page. No-op (returns false) when the target is out of
    /// `[1, total_pages]` or equals the current page. Never touches
    /// filters.
    pub async fn go_to_page(&mut self, page: u32) -> Result<bool> {
        let total_pages = self
            .result
            .as_ref()
            .map(|r| r.pagination.total_pages)
            .unwrap_or(0);
        if page < 1 || page > total_pages || page == self.page {
            debug!(page, total_pages, "page navigation ignored");
            return Ok(false);
        }
        self.page = page;
        self.refresh().await?;
        Ok(true)
    }

    pub async fn next_page(&mut self) -> Result<bool> {
        self.go_to_page(self.page + 1).await
    }

    pub async fn previous_page(&mut self) -> Result<bool> {
        let target = self.page.saturating_sub(1);
        self.go_to_page(target).await
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Toggle the favorite state of a player on the current page.
    /// Returns whether a mutation was dispatched.
    pub fn toggle_favorite(&mut self, player_id: PlayerId) -> bool {
        let Some(authoritative) = self
            .result
            .as_ref()
            .and_then(|r| r.items.iter().find(|p| p.id == player_id))
            .map(|p| p.is_favorited)
        else {
            debug!(player_id, "toggle ignored: player not on current page");
            return false;
        };
        let displayed = self.favorites.effective(player_id, authoritative);
        self.favorites.toggle(player_id, displayed)
    }

    // =========================================================================
    // Read surface for the presentation layer
    // =========================================================================

    /// Current page's players with the favorite shadow overlay applied.
    /// Returned by value: the presentation layer must never mutate the
    /// cached items.
    pub fn players(&self) -> Vec<PlayerResult> {
        let Some(result) = &self.result else {
            return Vec::new();
        };
        result
            .items
            .iter()
            .map(|item| {
                let mut item = item.clone();
                item.is_favorited = self.favorites.effective(item.id, item.is_favorited);
                item
            })
            .collect()
    }

    pub fn pagination(&self) -> Option<PaginationInfo> {
        self.result.as_ref().map(|r| r.pagination)
    }

    /// Derived pagination strip; `None` when one page (or none) needs no
    /// strip.
    pub fn page_window(&self) -> Option<PageWindow> {
        self.pagination().as_ref().and_then(PageWindow::compute)
    }

    pub fn live_filters(&self) -> &FilterSet {
        &self.live
    }

    pub fn current_page(&self) -> u32 {
        self.page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn favorites(&self) -> &FavoriteCoordinator {
        &self.favorites
    }

    /// Wait for background prefetches and favorite mutations. Test hook.
    pub async fn quiesce(&self) {
        self.scheduler.quiesce().await;
        self.favorites.quiesce().await;
    }
}
