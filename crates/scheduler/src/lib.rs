//! # Scheduler Crate
//!
//! Page-based query scheduling with predictive prefetch.
//!
//! ## Components
//!
//! - **cache**: keyed page-result cache with a staleness TTL and bounded
//!   capacity, the only shared mutable resource in the core
//! - **queue**: bounded queue for fire-and-forget background fetches
//! - **scheduler**: primary fetch plus prefetch of the next four pages
//!   and the previous page
//!
//! ## Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use model::{FilterSet, PageRequest};
//! use scheduler::QueryScheduler;
//!
//! let scheduler = QueryScheduler::new(Arc::new(my_backend));
//! let request = PageRequest::new(FilterSet::new(), 1, 20);
//!
//! // Resolves page 1, then warms pages 2-5 in the background.
//! let page = scheduler.schedule(&request).await?;
//! ```

// Public modules
pub mod cache;
pub mod queue;
pub mod scheduler;

// Re-export commonly used types
pub use cache::{CacheLookup, DEFAULT_CAPACITY, DEFAULT_TTL, ResultCache};
pub use queue::{BackgroundQueue, DEFAULT_QUEUE_CAPACITY};
pub use scheduler::{PREFETCH_AHEAD, QueryScheduler};
