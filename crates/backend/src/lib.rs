//! # Backend Crate
//!
//! The seam between the search orchestration core and its external
//! collaborators. The remote search and favorite endpoints are owned by
//! another system; this crate only defines the narrow async contracts the
//! core consumes, plus an in-memory implementation used by the CLI,
//! integration tests, and benches.
//!
//! ## Components
//!
//! - **SearchBackend / FavoriteBackend**: async endpoint traits
//! - **Notifier**: fire-and-forget side channel for success/failure notices
//! - **memory**: deterministic in-memory roster backend with latency and
//!   failure injection
//! - **roster**: deterministic roster fixtures

use async_trait::async_trait;
use tracing::{info, warn};

use model::{FilterSet, PageResult, PlayerId, Result};

pub mod memory;
pub mod roster;

pub use memory::InMemoryBackend;

/// Remote search endpoint.
///
/// Expected to be idempotent and side-effect-free, returning a stable
/// total count for a given filter set modulo concurrent data mutation
/// elsewhere in the platform.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Fetch one page of results for a filter set. `page` is 1-indexed.
    async fn search(&self, filters: &FilterSet, page: u32, page_size: u32) -> Result<PageResult>;
}

/// Remote favorite/unfavorite endpoint.
///
/// Both directions are idempotent: favoriting an already-favorited player
/// is an acknowledged no-op, not an error.
#[async_trait]
pub trait FavoriteBackend: Send + Sync {
    async fn set_favorite(&self, player_id: PlayerId, favorited: bool) -> Result<()>;
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Side channel for notices a host UI may render as toasts.
///
/// This is not part of the data contract; implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// Notifier that routes notices into the tracing log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => info!("{message}"),
            NoticeKind::Error => warn!("{message}"),
        }
    }
}
