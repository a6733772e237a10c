use thiserror::Error;

/// Error taxonomy of the search core.
///
/// Bad-input variants (`InvalidFilter`, `InvalidPageSize`, `InvalidCursor`)
/// are detected eagerly, before any store access. Transient variants
/// (`CatalogUnavailable`, `Timeout`) abort the plan with no partial page;
/// retry policy belongs to the caller, the core never retries internally.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("invalid page size {given} (allowed range 1..={max})")]
    InvalidPageSize { given: usize, max: usize },

    #[error("invalid pagination cursor")]
    InvalidCursor,

    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("search stage `{stage}` timed out")]
    Timeout { stage: &'static str },

    #[error("search cancelled by caller")]
    Cancelled,
}

impl SearchError {
    /// Whether a caller may retry the same request (with backoff, and a
    /// fresh cursor after a timeout).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SearchError::CatalogUnavailable(_) | SearchError::Timeout { .. }
        )
    }
}

impl From<crate::catalog::CatalogError> for SearchError {
    fn from(err: crate::catalog::CatalogError) -> Self {
        match err {
            crate::catalog::CatalogError::Unavailable(msg) => SearchError::CatalogUnavailable(msg),
        }
    }
}

pub type SearchResult<T> = Result<T, SearchError>;
