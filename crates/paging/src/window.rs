//! Page window derivation for the pagination strip.
//!
//! Given a current page and a total page count, compute the bounded set of
//! page numbers to display (at most [`MAX_WINDOW`], centered on the current
//! page, clamped to `[1, total_pages]`), the next/previous availability,
//! and the human-readable item range ("21–40 of 47").

use model::PaginationInfo;
use tracing::debug;

/// Maximum number of page buttons shown at once.
pub const MAX_WINDOW: usize = 5;

/// Everything the pagination strip needs for one page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Page the window is centered on (clamped into range)
    pub current_page: u32,
    pub total_pages: u32,
    /// Consecutive page numbers to display, length `min(5, total_pages)`
    pub pages: Vec<u32>,
    pub has_next: bool,
    pub has_previous: bool,
    /// Inclusive 1-indexed range of items on this page
    pub first_item: u64,
    pub last_item: u64,
    pub total_count: u64,
}

impl PageWindow {
    /// Compute the window for a page position.
    ///
    /// Returns `None` when `total_pages <= 1`: a single page (or an empty
    /// result set) needs no pagination UI at all.
    ///
    /// A `current_page` beyond `total_pages` is clamped defensively; this
    /// happens when a filter change shrinks the result set under a page
    /// the user had navigated to.
    pub fn compute(info: &PaginationInfo) -> Option<Self> {
        if info.total_pages <= 1 {
            return None;
        }

        let total_pages = info.total_pages;
        let current = if info.current_page > total_pages {
            debug!(
                requested = info.current_page,
                total_pages, "clamping current page into range"
            );
            total_pages
        } else {
            info.current_page.max(1)
        };

        let pages = window_pages(current, total_pages);
        let (first_item, last_item) = item_range(current, info.page_size, info.total_count);

        Some(Self {
            current_page: current,
            total_pages,
            pages,
            has_next: current < total_pages,
            has_previous: current > 1,
            first_item,
            last_item,
            total_count: info.total_count,
        })
    }

    /// Display text for the item range, e.g. "1–20 of 47".
    pub fn range_text(&self) -> String {
        format!("{}–{} of {}", self.first_item, self.last_item, self.total_count)
    }
}

/// Consecutive run of page numbers, at most [`MAX_WINDOW`] long, centered
/// on `current` and clamped to `[1, total_pages]`.
fn window_pages(current: u32, total_pages: u32) -> Vec<u32> {
    let half = (MAX_WINDOW as u32) / 2;
    let mut start = current.saturating_sub(half).max(1);
    let end = (start + MAX_WINDOW as u32 - 1).min(total_pages);
    // Re-anchor when clamped at the high end so the window stays full
    start = end.saturating_sub(MAX_WINDOW as u32 - 1).max(1);
    (start..=end).collect()
}

/// Inclusive item range covered by `current` at `page_size`, capped at the
/// total count on the final page.
fn item_range(current: u32, page_size: u32, total_count: u64) -> (u64, u64) {
    let first = (current as u64 - 1) * page_size as u64 + 1;
    let last = (current as u64 * page_size as u64).min(total_count);
    (first.min(last), last)
}
