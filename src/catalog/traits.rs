use crate::models::{Property, PropertyCategory, PropertyStatus, PropertyType, User};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a catalog store
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Filter clauses a store can evaluate itself during a scan.
/// Only low-cardinality equalities and the price range are push-down-able;
/// everything else is evaluated in-memory after fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScanFilter {
    pub property_type: Option<PropertyType>,
    pub category: Option<PropertyCategory>,
    pub status: Option<PropertyStatus>,
    /// Inclusive price bounds
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl ScanFilter {
    pub fn is_empty(&self) -> bool {
        self.property_type.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    /// Whether a property satisfies every clause of this filter.
    pub fn matches(&self, p: &Property) -> bool {
        if let Some(t) = self.property_type {
            if p.property_type != t {
                return false;
            }
        }
        if let Some(c) = self.category {
            if p.category != c {
                return false;
            }
        }
        if let Some(s) = self.status {
            if p.status != s {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if p.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if p.price > max {
                return false;
            }
        }
        true
    }
}

/// Order a store is asked to return scanned properties in. A store that
/// honors a hint must break ties by id ascending: the engine stops
/// scanning early once a page is satisfied in hint order, and a different
/// tie-break would let items slip between pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderHint {
    /// Stable id order; always available
    Id,
    CreatedAtDesc,
    PriceAsc,
    PriceDesc,
}

/// One paged scan request against the store
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub filter: ScanFilter,
    pub order: OrderHint,
    /// Continuation token from a previous scan page, opaque to callers
    pub token: Option<String>,
    pub limit: usize,
}

/// One page of scan results
#[derive(Debug, Clone)]
pub struct ScanPage {
    pub items: Vec<Property>,
    pub next_token: Option<String>,
}

/// Durable backing store for properties and users. External collaborator:
/// the search core only consumes this interface and never takes locks of
/// its own.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch a single property by id.
    async fn fetch_by_id(&self, id: &str) -> CatalogResult<Option<Property>>;

    /// Fetch a single user by id.
    async fn fetch_user(&self, id: &str) -> CatalogResult<Option<User>>;

    /// Paged scan with push-down filtering and an order hint.
    async fn scan(&self, req: ScanRequest) -> CatalogResult<ScanPage>;

    /// Best-effort batched view-count increment. `request_id` lets the
    /// store dedupe retries of the same logical request.
    async fn record_views(&self, ids: &[String], request_id: &str) -> CatalogResult<()>;

    /// Best-effort match count for a push-down filter; may be stale.
    async fn estimate_total(&self, filter: &ScanFilter) -> CatalogResult<Option<usize>>;
}
