//! Keyed page-result cache with a staleness TTL.
//!
//! Entries are keyed by the canonical serialization of the page request
//! (see `model::PageRequest::cache_key`). Within the TTL an entry is fresh
//! and served without a refetch; past the TTL it is still served, but the
//! scheduler refreshes it in the background. Capacity is bounded: inserts
//! past capacity first drop entries older than twice the TTL, then the
//! oldest entry.
//!
//! All access happens through a short-lived mutex; results are cloned out
//! so no lock is held across an await point.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

use model::PageResult;

/// How long a cached page is served without a background refresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Maximum number of cached pages.
pub const DEFAULT_CAPACITY: usize = 64;

/// Outcome of a cache probe.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    /// Entry within the TTL: serve as-is.
    Fresh(PageResult),
    /// Entry past the TTL: serve, but refresh in the background.
    Stale(PageResult),
    Miss,
}

struct CacheEntry {
    result: PageResult,
    fetched_at: Instant,
}

/// Shared page-result cache. Written by the scheduler, read by the search
/// coordinator.
pub struct ResultCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl ResultCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    pub fn lookup(&self, key: &str) -> CacheLookup {
        let entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.fetched_at.elapsed() <= self.ttl => {
                CacheLookup::Fresh(entry.result.clone())
            }
            Some(entry) => CacheLookup::Stale(entry.result.clone()),
            None => CacheLookup::Miss,
        }
    }

    /// Whether a fresh entry exists for `key`. Used to skip redundant
    /// prefetches.
    pub fn contains_fresh(&self, key: &str) -> bool {
        matches!(self.lookup(key), CacheLookup::Fresh(_))
    }

    /// Insert or supersede the entry for `key`.
    pub fn insert(&self, key: String, result: PageResult) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            self.evict_locked(&mut entries);
        }
        entries.insert(
            key,
            CacheEntry {
                result,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop long-expired entries, then the oldest entry if still at
    /// capacity. Called with the map lock held.
    fn evict_locked(&self, entries: &mut HashMap<String, CacheEntry>) {
        let grace = self.ttl * 2;
        let before = entries.len();
        entries.retain(|_, entry| entry.fetched_at.elapsed() <= grace);
        if entries.len() >= self.capacity {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(key, _)| key.clone())
            {
                entries.remove(&oldest);
            }
        }
        debug!(evicted = before - entries.len(), "cache eviction pass");
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{PageResult, PaginationInfo};

    fn page(current_page: u32) -> PageResult {
        PageResult {
            items: vec![],
            pagination: PaginationInfo::derive(current_page, 20, 100),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_within_ttl_then_stale() {
        let cache = ResultCache::default();
        cache.insert("k".to_string(), page(1));

        assert!(matches!(cache.lookup("k"), CacheLookup::Fresh(_)));

        tokio::time::advance(DEFAULT_TTL + Duration::from_secs(1)).await;
        assert!(matches!(cache.lookup("k"), CacheLookup::Stale(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn refetch_supersedes_and_refreshes() {
        let cache = ResultCache::default();
        cache.insert("k".to_string(), page(1));
        tokio::time::advance(DEFAULT_TTL + Duration::from_secs(1)).await;

        cache.insert("k".to_string(), page(1));
        assert!(matches!(cache.lookup("k"), CacheLookup::Fresh(_)));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_evicts_oldest() {
        let cache = ResultCache::new(DEFAULT_TTL, 3);
        for i in 0..3 {
            cache.insert(format!("k{i}"), page(1));
            tokio::time::advance(Duration::from_secs(1)).await;
        }

        cache.insert("k3".to_string(), page(1));
        assert_eq!(cache.len(), 3);
        assert!(matches!(cache.lookup("k0"), CacheLookup::Miss));
        assert!(matches!(cache.lookup("k3"), CacheLookup::Fresh(_)));
    }

    #[tokio::test]
    async fn miss_for_unknown_key() {
        let cache = ResultCache::default();
        assert!(matches!(cache.lookup("nope"), CacheLookup::Miss));
        assert!(cache.is_empty());
    }
}
