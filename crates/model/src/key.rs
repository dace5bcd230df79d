//! Canonical cache keys for page requests.
//!
//! The result cache is keyed by an explicit serialization of
//! `(FilterSet, page, page_size)` rather than an ambient framework cache.
//! Struct fields serialize in declaration order, so the JSON form is
//! canonical: equal requests always produce byte-identical keys, and any
//! filter difference produces a different key.

use serde::Serialize;

use crate::error::{Result, SearchError};
use crate::types::FilterSet;

/// A fully-specified page request: the unit the scheduler fetches and the
/// cache stores. Page numbers are 1-indexed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRequest {
    pub filters: FilterSet,
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(filters: FilterSet, page: u32, page_size: u32) -> Self {
        Self {
            filters,
            page,
            page_size,
        }
    }

    /// Canonical cache key for this request.
    pub fn cache_key(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| SearchError::KeyEncoding(e.to_string()))
    }

    /// The same request pointed at a different page. Used by the scheduler
    /// to derive prefetch targets.
    pub fn for_page(&self, page: u32) -> Self {
        Self {
            filters: self.filters.clone(),
            page,
            page_size: self.page_size,
        }
    }
}
