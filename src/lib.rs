//! Property search and filtering engine for the ODIN listings platform.
//!
//! Takes a [`search::SearchFilters`] query plus a catalog of
//! [`models::Property`] records and returns a deterministically ordered,
//! cursor-paginated, relation-hydrated result page. Storage is behind the
//! [`catalog::CatalogStore`] seam; everything else is this crate.

pub mod catalog;
pub mod models;
pub mod search;

pub use catalog::{CatalogStore, MemoryCatalog};
pub use search::{
    CancelHandle, SearchEngine, SearchError, SearchFilters, SearchOptions, SearchResultPage,
    SortKey,
};
