//! Query scheduling: primary fetches plus speculative prefetch.
//!
//! The scheduler owns the result cache and the only path to the search
//! endpoint. A `schedule` call resolves the requested page (from cache
//! when fresh, otherwise from the backend) and then warms the cache for
//! the pages the user is most likely to visit next: the following
//! [`PREFETCH_AHEAD`] pages and the immediately preceding page.
//!
//! Failure semantics: a failed primary fetch surfaces to the caller; a
//! failed background fetch is logged at debug level and dropped; it
//! simply does not warm the cache. Prefetch targets computed against a
//! superseded filter set are not cancelled; they complete into cache keys
//! nobody will read again and age out of the cache.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use backend::SearchBackend;
use model::{PageRequest, PageResult, Result};

use crate::cache::{CacheLookup, ResultCache};
use crate::queue::BackgroundQueue;

/// How many pages past the current one are prefetched.
pub const PREFETCH_AHEAD: u32 = 4;

/// Pages a `schedule` call resolves and speculatively extends.
#[derive(Clone)]
pub struct QueryScheduler {
    search: Arc<dyn SearchBackend>,
    cache: Arc<ResultCache>,
    queue: Arc<BackgroundQueue>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl QueryScheduler {
    pub fn new(search: Arc<dyn SearchBackend>) -> Self {
        Self::with_cache(search, Arc::new(ResultCache::default()))
    }

    pub fn with_cache(search: Arc<dyn SearchBackend>, cache: Arc<ResultCache>) -> Self {
        Self {
            search,
            cache,
            queue: Arc::new(BackgroundQueue::default()),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Resolve `request`, then warm the cache around it.
    ///
    /// Fresh cache entries are served without a refetch. Stale entries are
    /// served immediately and refreshed in the background. Misses await
    /// the backend and surface its error.
    pub async fn schedule(&self, request: &PageRequest) -> Result<PageResult> {
        let key = request.cache_key()?;

        let result = match self.cache.lookup(&key) {
            CacheLookup::Fresh(result) => {
                debug!(page = request.page, "cache hit (fresh)");
                result
            }
            CacheLookup::Stale(result) => {
                debug!(page = request.page, "cache hit (stale), refreshing in background");
                self.spawn_background_fetch(request.clone(), key);
                result
            }
            CacheLookup::Miss => {
                debug!(page = request.page, "cache miss, fetching");
                let fetched = self
                    .search
                    .search(&request.filters, request.page, request.page_size)
                    .await?;
                self.cache.insert(key, fetched.clone());
                info!(
                    page = request.page,
                    total = fetched.pagination.total_count,
                    "primary fetch resolved"
                );
                fetched
            }
        };

        self.spawn_prefetches(request, result.pagination.total_pages);
        Ok(result)
    }

    /// Wait for all background fetches scheduled so far. Deterministic
    /// hook for tests and the demo CLI; production callers never need it.
    pub async fn quiesce(&self) {
        self.queue.quiesce().await;
    }

    /// Queue background fetches for `page+1 ..= page+PREFETCH_AHEAD`
    /// (bounded by the total) and `page-1` when it exists. Targets already
    /// fresh in cache or already being fetched are skipped.
    fn spawn_prefetches(&self, request: &PageRequest, total_pages: u32) {
        let page = request.page;
        let last_forward = page.saturating_add(PREFETCH_AHEAD).min(total_pages);

        let mut targets: Vec<u32> = (page + 1..=last_forward).collect();
        if page > 1 {
            targets.push(page - 1);
        }

        for target in targets {
            let prefetch = request.for_page(target);
            let key = match prefetch.cache_key() {
                Ok(key) => key,
                Err(e) => {
                    debug!("skipping prefetch for page {target}: {e}");
                    continue;
                }
            };
            if self.cache.contains_fresh(&key) {
                continue;
            }
            self.spawn_background_fetch(prefetch, key);
        }
    }

    /// Fire-and-forget fetch of one page into the cache, deduplicated by
    /// key against other in-flight background fetches.
    fn spawn_background_fetch(&self, request: PageRequest, key: String) {
        if !self.in_flight.lock().insert(key.clone()) {
            debug!(page = request.page, "background fetch already in flight");
            return;
        }

        let search = Arc::clone(&self.search);
        let cache = Arc::clone(&self.cache);
        let in_flight = Arc::clone(&self.in_flight);
        let release_key = key.clone();

        let spawned = self.queue.try_spawn(async move {
            let outcome = search
                .search(&request.filters, request.page, request.page_size)
                .await;
            match outcome {
                Ok(result) => cache.insert(key.clone(), result),
                // Swallowed by contract: a failed prefetch has no
                // user-visible effect, it just doesn't warm the cache.
                Err(e) => debug!(page = request.page, "background fetch failed: {e}"),
            }
            in_flight.lock().remove(&key);
        });

        if !spawned {
            // try_spawn declined (queue saturated); release the claim so a
            // later attempt can retry this key.
            self.in_flight.lock().remove(&release_key);
        }
    }
}
