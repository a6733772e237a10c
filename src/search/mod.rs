pub mod assemble;
pub mod error;
pub mod filter;
pub mod plan;
pub mod rank;
pub mod types;

pub use error::{SearchError, SearchResult};
pub use types::{
    PropertyView, RankSpec, SearchFilters, SearchOptions, SearchResultPage, SortKey,
    DEFAULT_PAGE_SIZE, DEFAULT_STAGE_TIMEOUT, MAX_PAGE_SIZE,
};

use crate::catalog::{CatalogStore, ScanRequest};
use crate::models::Property;
use chrono::Utc;
use rank::{Cursor, RankKey};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Cooperative cancellation flag for an in-flight search. Checked between
/// plan stages, never mid-stage; a cancelled request produces no view
/// increment.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// The property search engine. Stateless per request: concurrent searches
/// share nothing but the catalog store behind its own synchronization.
pub struct SearchEngine {
    store: Arc<dyn CatalogStore>,
    max_page_size: usize,
    default_timeout: Duration,
    request_seq: AtomicU64,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            max_page_size: MAX_PAGE_SIZE,
            default_timeout: DEFAULT_STAGE_TIMEOUT,
            request_seq: AtomicU64::new(0),
        }
    }

    pub fn with_limits(mut self, max_page_size: usize, default_timeout: Duration) -> Self {
        self.max_page_size = max_page_size;
        self.default_timeout = default_timeout;
        self
    }

    /// Run a search to completion. See [`Self::search_cancellable`].
    pub async fn search(
        &self,
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> SearchResult<SearchResultPage> {
        self.search_cancellable(filters, options, &CancelHandle::new())
            .await
    }

    /// Run a search with cooperative cancellation: compile the filters,
    /// plan, execute against the catalog, rank and slice one page, then
    /// hydrate relations. Input validation happens before any store access.
    pub async fn search_cancellable(
        &self,
        filters: &SearchFilters,
        options: &SearchOptions,
        cancel: &CancelHandle,
    ) -> SearchResult<SearchResultPage> {
        let page_size = rank::validate_page_size(
            options.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            self.max_page_size,
        )?;
        let sort = options.sort.unwrap_or_default();
        let featured_first = options.featured_first.unwrap_or(true);
        let cursor = match &options.cursor {
            Some(token) => {
                let c = Cursor::decode(token)?;
                // A cursor minted under a different rank order would be
                // misread as a position in this one.
                if c.spec != (RankSpec { featured_first, key: sort }) {
                    return Err(SearchError::InvalidCursor);
                }
                Some(c)
            }
            None => None,
        };

        let (predicate, rank_spec) = filter::compile(filters, options.sort, featured_first)?;
        let exec_plan = plan::plan(&predicate, &rank_spec);
        let stage_timeout = options.timeout.unwrap_or(self.default_timeout);
        debug!(
            residual = exec_plan.residual.len(),
            paginate_at_store = exec_plan.paginate_at_store,
            ?sort,
            "execution plan ready"
        );

        let matches = self
            .execute(&exec_plan, &rank_spec, cursor.as_ref(), page_size, stage_timeout, cancel)
            .await?;

        let ranked = rank::rank_and_page(matches, &rank_spec, cursor.as_ref(), page_size)?;

        let total_approx = match self.store.estimate_total(&exec_plan.scan_filter).await {
            Ok(total) => total,
            Err(err) => {
                warn!(%err, "total estimate unavailable");
                None
            }
        };

        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        let items = timeout(stage_timeout, assemble::assemble(ranked.items, self.store.as_ref()))
            .await
            .map_err(|_| SearchError::Timeout { stage: "hydrate" })??;

        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        if options.record_views {
            let request_id = self.next_request_id();
            assemble::record_page_views(&items, self.store.as_ref(), &request_id).await;
        }

        info!(
            returned = items.len(),
            has_more = ranked.has_more,
            "search complete"
        );
        Ok(SearchResultPage {
            items,
            next_cursor: ranked.next_cursor.map(|c| c.encode()),
            has_more: ranked.has_more,
            total_approx,
        })
    }

    /// Record a single property view, the explicit side-effecting operation
    /// a detail page uses. Search never calls this. Returns the property
    /// when it exists; a view of an unknown id is a no-op.
    pub async fn record_view(&self, property_id: &str) -> SearchResult<Option<Property>> {
        let Some(property) = self.store.fetch_by_id(property_id).await? else {
            warn!(property_id, "view recorded against unknown property");
            return Ok(None);
        };
        let request_id = self.next_request_id();
        self.store
            .record_views(&[property_id.to_string()], &request_id)
            .await?;
        Ok(Some(property))
    }

    /// Stream scan pages from the store, applying residual clauses as each
    /// page arrives. Cancellation is checked between stages; each store
    /// call is bounded by the stage timeout.
    async fn execute(
        &self,
        exec_plan: &plan::ExecutionPlan,
        rank_spec: &RankSpec,
        cursor: Option<&Cursor>,
        page_size: usize,
        stage_timeout: Duration,
        cancel: &CancelHandle,
    ) -> SearchResult<Vec<Property>> {
        let mut matches = Vec::new();
        let mut token: Option<String> = None;
        // With store-order pagination we can stop as soon as page_size + 1
        // items past the cursor are in hand.
        let mut past_cursor = 0usize;

        loop {
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }
            let page = timeout(
                stage_timeout,
                self.store.scan(ScanRequest {
                    filter: exec_plan.scan_filter.clone(),
                    order: exec_plan.order_hint,
                    token: token.clone(),
                    limit: exec_plan.batch_limit,
                }),
            )
            .await
            .map_err(|_| SearchError::Timeout { stage: "scan" })??;

            for property in page.items {
                if !exec_plan.residual.iter().all(|c| c.matches(&property)) {
                    continue;
                }
                if exec_plan.paginate_at_store {
                    let key = RankKey::of(&property, rank_spec);
                    if cursor.map_or(true, |c| key > c.last) {
                        past_cursor += 1;
                    }
                }
                matches.push(property);
            }

            if exec_plan.paginate_at_store && past_cursor > page_size {
                debug!(collected = matches.len(), "early exit: page satisfied in scan order");
                break;
            }
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(matches)
    }

    fn next_request_id(&self) -> String {
        let seq = self.request_seq.fetch_add(1, Ordering::Relaxed);
        format!("search-{}-{}", Utc::now().timestamp_micros(), seq)
    }
}
