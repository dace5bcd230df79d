//! Error types for the search orchestration core.

use thiserror::Error;

use crate::types::PlayerId;

/// Errors that can surface from search and favorite operations.
///
/// The remote endpoint does not distinguish transient failures from
/// validation or permission failures at this layer; both arrive as a
/// message string and are surfaced the same way. Distinguishing them is
/// the endpoint's responsibility.
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// The search endpoint rejected or failed the request
    #[error("search request failed: {message}")]
    Backend { message: String },

    /// A favorite/unfavorite mutation failed
    #[error("favorite update failed for player {player_id}: {message}")]
    Favorite { player_id: PlayerId, message: String },

    /// A page request fell outside the known page range
    #[error("page {page} is out of range (total pages: {total_pages})")]
    PageOutOfRange { page: u32, total_pages: u32 },

    /// A cache key could not be serialized
    #[error("failed to build cache key: {0}")]
    KeyEncoding(String),
}

/// Convenience type alias for Results in this workspace
pub type Result<T> = std::result::Result<T, SearchError>;
