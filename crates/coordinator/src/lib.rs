//! # Coordinator Crate
//!
//! Top-level search session state: debounced filter input, page
//! navigation, and optimistic favorite toggles, composed over the query
//! scheduler.
//!
//! ## Components
//!
//! - **debounce**: delayed value propagation with abort-on-supersede
//! - **favorites**: optimistic favorite mutations with shadow-state
//!   reconciliation and a fallback timer
//! - **search**: the [`SearchCoordinator`] a host UI drives, one
//!   instance per search session
//!
//! ## Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use backend::{InMemoryBackend, LogNotifier, roster};
//! use coordinator::SearchCoordinator;
//!
//! let backend = Arc::new(InMemoryBackend::new(roster::generate(200)));
//! let mut session =
//!     SearchCoordinator::new(backend.clone(), backend, Arc::new(LogNotifier));
//!
//! session.init().await?;
//! session.set_search("ace");
//! session.settle().await?; // fetches once the input goes quiet
//! for player in session.players() {
//!     println!("{}", player.gamertag);
//! }
//! ```

// Public modules
pub mod debounce;
pub mod favorites;
pub mod search;

// Re-export commonly used types
pub use debounce::Debouncer;
pub use favorites::{FAVORITE_FALLBACK, FavoriteCoordinator};
pub use search::{DEBOUNCE_DELAY, DEFAULT_PAGE_SIZE, MIN_SEARCH_LEN, SearchCoordinator};
