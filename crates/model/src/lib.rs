//! # Model Crate
//!
//! Shared value objects for the recruiting search core.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (FilterSet, PlayerResult, PageResult)
//! - **key**: Canonical cache keys for page requests
//! - **error**: Error types shared across the workspace
//!
//! ## Example Usage
//!
//! ```ignore
//! use model::{FilterSet, PageRequest, SortField, SortDirection};
//!
//! let filters = FilterSet::new()
//!     .with_search("aceplayer")
//!     .with_class_year(2026)
//!     .with_sort(SortField::Gpa, SortDirection::Desc);
//!
//! let request = PageRequest::new(filters, 1, 20);
//! let key = request.cache_key()?;
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod key;

// Re-export commonly used types for convenience
pub use error::{Result, SearchError};
pub use key::PageRequest;
pub use types::{
    // Type aliases
    PlayerId,
    // Core types
    FilterSet,
    GameProfile,
    PageResult,
    PaginationInfo,
    PlayerResult,
    // Enums
    SchoolType,
    SortDirection,
    SortField,
};
