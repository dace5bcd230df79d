//! Core domain types for the recruiting search system.
//!
//! This module defines the value objects shared by every layer:
//! - `FilterSet`: the immutable bundle of all search/filter criteria
//! - `PlayerResult`: a single search hit owned by the remote endpoint
//! - `PaginationInfo` / `PageResult`: one fetched page plus its metadata

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a player profile
pub type PlayerId = u64;

// =============================================================================
// Filter Types
// =============================================================================

/// Which field search results are ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortField {
    #[default]
    Relevance,
    Gamertag,
    Gpa,
    ClassYear,
}

/// Ordering direction for sorted queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

/// School categories a recruiter can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchoolType {
    HighSchool,
    JuniorCollege,
    University,
    Academy,
}

/// Immutable bundle of all search/filter criteria.
///
/// Two `FilterSet`s are compared by deep structural equality (`PartialEq`)
/// to detect "settled" state after debouncing; that comparison is the
/// trigger for resetting pagination, so the type is a closed record rather
/// than an open map of keys.
///
/// List fields hold unique values (the builder-style setters dedupe).
/// GPA bounds are expected to satisfy `min <= max` when both are present;
/// that is enforced by the consuming UI, not validated here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterSet {
    /// Free-text search over gamertag / real name
    pub search: String,
    /// Graduation years, unique, e.g. [2026, 2027]
    pub class_years: Vec<u16>,
    /// Inclusive lower GPA bound
    pub gpa_min: Option<f32>,
    /// Inclusive upper GPA bound
    pub gpa_max: Option<f32>,
    /// School categories, unique
    pub school_types: Vec<SchoolType>,
    /// Game identifier, e.g. "valorant"
    pub game: Option<String>,
    /// In-game role, e.g. "igl", "support"
    pub role: Option<String>,
    /// Self-described play style
    pub play_style: Option<String>,
    /// Free-text location match
    pub location: String,
    /// Restrict to players the recruiter has favorited
    pub favorited_only: bool,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the free-text search term.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Add a class year, ignoring duplicates.
    pub fn with_class_year(mut self, year: u16) -> Self {
        if !self.class_years.contains(&year) {
            self.class_years.push(year);
        }
        self
    }

    /// Add a school type, ignoring duplicates.
    pub fn with_school_type(mut self, school_type: SchoolType) -> Self {
        if !self.school_types.contains(&school_type) {
            self.school_types.push(school_type);
        }
        self
    }

    pub fn with_gpa_range(mut self, min: Option<f32>, max: Option<f32>) -> Self {
        self.gpa_min = min;
        self.gpa_max = max;
        self
    }

    pub fn with_game(mut self, game: impl Into<String>) -> Self {
        self.game = Some(game.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_favorited_only(mut self, favorited_only: bool) -> Self {
        self.favorited_only = favorited_only;
        self
    }

    pub fn with_sort(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort_field = field;
        self.sort_direction = direction;
        self
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// Per-game competitive profile embedded in a search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameProfile {
    pub game: String,
    pub role: String,
    pub play_style: String,
    pub rank: String,
    pub hours_played: u32,
}

/// A single search hit.
///
/// Owned by the remote endpoint; the orchestration layer never mutates one
/// of these directly. Favorite state changes are layered on top through
/// the shadow overlay in the coordinator crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub id: PlayerId,
    pub gamertag: String,
    pub real_name: String,
    pub class_year: u16,
    pub gpa: f32,
    pub school: String,
    pub school_type: SchoolType,
    pub location: String,
    /// Authoritative favorite flag as last reported by the server
    pub is_favorited: bool,
    pub profiles: Vec<GameProfile>,
}

// =============================================================================
// Pagination Types
// =============================================================================

/// Metadata describing one fetched page within the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    /// 1-indexed page this result holds
    pub current_page: u32,
    pub page_size: u32,
    /// Total matching items across all pages
    pub total_count: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PaginationInfo {
    /// Derive full pagination metadata from a page position and total count.
    pub fn derive(current_page: u32, page_size: u32, total_count: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_count.div_ceil(page_size as u64) as u32
        };
        Self {
            current_page,
            page_size,
            total_count,
            total_pages,
            has_next: current_page < total_pages,
            has_previous: current_page > 1,
        }
    }
}

/// One page of results as returned by a successful fetch.
///
/// Created by the scheduler, held in the cache until evicted or superseded
/// by a refetch of the same key, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<PlayerResult>,
    pub pagination: PaginationInfo,
}
