use crate::models::{Property, PropertyCategory, PropertyStatus, PropertyType, User};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default page size when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Upper bound on the page size a caller may request
pub const MAX_PAGE_SIZE: usize = 100;
/// Deadline applied to each blocking plan stage unless the caller supplies one
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Search filters for property queries. All fields are optional and
/// combine with AND semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Kind of property (exact match)
    #[serde(rename = "type")]
    pub property_type: Option<PropertyType>,
    /// Listing category (exact match)
    pub category: Option<PropertyCategory>,
    /// Listing status (exact match)
    pub status: Option<PropertyStatus>,
    /// Minimum price, inclusive
    pub min_price: Option<i64>,
    /// Maximum price, inclusive
    pub max_price: Option<i64>,
    /// Minimum number of bedrooms ("at least N")
    pub bedrooms: Option<u32>,
    /// Minimum number of bathrooms ("at least N")
    pub bathrooms: Option<u32>,
    /// Minimum area in square meters, inclusive.
    /// A property with no recorded area never matches an area filter.
    pub min_area: Option<u32>,
    /// Maximum area in square meters, inclusive
    pub max_area: Option<u32>,
    /// City, case-insensitive exact match
    pub city: Option<String>,
    /// Province, case-insensitive exact match
    pub province: Option<String>,
    /// Feature tags the property must all carry
    #[serde(default)]
    pub features: Vec<String>,
}

/// Sort key for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Most recently listed first (default)
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    /// Highest AI valuation first; properties without a valuation sort last
    ValuationDesc,
    /// Most viewed first
    ViewsDesc,
}

/// Total order over matches: featured listings first (when enabled), then
/// the sort key, then id ascending as the unconditional tie-break. The
/// tie-break guarantees a strict total order, which stable cursors need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankSpec {
    pub featured_first: bool,
    pub key: SortKey,
}

impl Default for RankSpec {
    fn default() -> Self {
        Self {
            featured_first: true,
            key: SortKey::Newest,
        }
    }
}

/// Per-request knobs accompanying the filters
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Opaque cursor from a previous page
    pub cursor: Option<String>,
    /// Page size, 1..=MAX_PAGE_SIZE; defaults to DEFAULT_PAGE_SIZE
    pub page_size: Option<usize>,
    /// Sort override; defaults to SortKey::Newest
    pub sort: Option<SortKey>,
    /// Whether featured listings outrank the sort key; defaults to true.
    /// Opting out yields a plain single-key order, which a store scan can
    /// serve directly.
    pub featured_first: Option<bool>,
    /// Opt in to the batched view-count increment for returned items
    pub record_views: bool,
    /// Per-stage deadline override
    pub timeout: Option<Duration>,
}

/// A returned property with its relations hydrated: owner joined from the
/// user collaborator, images sorted by display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyView {
    pub property: Property,
    pub owner: User,
}

/// One page of search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultPage {
    pub items: Vec<PropertyView>,
    /// Cursor for the page after this one; None on the last page
    pub next_cursor: Option<String>,
    pub has_more: bool,
    /// Best-effort match count; may be stale and may overcount matches
    /// that in-memory clauses would still reject
    pub total_approx: Option<usize>,
}
