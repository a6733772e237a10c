use crate::catalog::{OrderHint, ScanFilter};
use crate::search::filter::{Clause, Predicate};
use crate::search::types::{RankSpec, SortKey};

/// Properties fetched from the store per scan stage
pub const SCAN_BATCH_LIMIT: usize = 256;

/// A finite, acyclic evaluation strategy for one search request: a single
/// push-down scan loop followed by in-memory residual filtering. Idempotent
/// for a given catalog snapshot; the engine runs every stage exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    /// Clauses delegated to the store's paged scan
    pub scan_filter: ScanFilter,
    /// Order the store is asked to scan in
    pub order_hint: OrderHint,
    /// Clauses evaluated in-memory after fetch, cheapest class first
    pub residual: Vec<Clause>,
    /// True when the store's scan order already is the rank order, so the
    /// engine may stop fetching once a page worth of matches is in hand
    /// instead of ranking the full match set
    pub paginate_at_store: bool,
    /// Fetch size per scan stage
    pub batch_limit: usize,
}

fn order_hint_for(spec: &RankSpec) -> Option<OrderHint> {
    // Featured-first interleaves two partitions of the sort key; no single
    // store order hint represents that.
    if spec.featured_first {
        return None;
    }
    match spec.key {
        SortKey::Newest => Some(OrderHint::CreatedAtDesc),
        SortKey::PriceAsc => Some(OrderHint::PriceAsc),
        SortKey::PriceDesc => Some(OrderHint::PriceDesc),
        SortKey::ValuationDesc | SortKey::ViewsDesc => None,
    }
}

/// Build the execution plan for a compiled predicate: push equality and
/// price-range clauses down to the store, keep the rest in-memory ordered
/// by estimated selectivity (most selective class first).
pub fn plan(predicate: &Predicate, rank_spec: &RankSpec) -> ExecutionPlan {
    let mut scan_filter = ScanFilter::default();
    let mut residual = Vec::new();

    for clause in &predicate.clauses {
        match clause {
            Clause::TypeEq(t) => scan_filter.property_type = Some(*t),
            Clause::CategoryEq(c) => scan_filter.category = Some(*c),
            Clause::StatusEq(s) => scan_filter.status = Some(*s),
            Clause::PriceRange { min, max } => {
                scan_filter.min_price = *min;
                scan_filter.max_price = *max;
            }
            Clause::BedroomsAtLeast(_)
            | Clause::BathroomsAtLeast(_)
            | Clause::AreaRange { .. }
            | Clause::CityEq(_)
            | Clause::ProvinceEq(_)
            | Clause::FeatureSubset(_) => residual.push(clause.clone()),
        }
    }
    residual.sort_by_key(|c| c.selectivity_class());

    let (order_hint, paginate_at_store) = match order_hint_for(rank_spec) {
        Some(hint) if residual.is_empty() => (hint, true),
        Some(hint) => (hint, false),
        None => (OrderHint::Id, false),
    };

    ExecutionPlan {
        scan_filter,
        order_hint,
        residual,
        paginate_at_store,
        batch_limit: SCAN_BATCH_LIMIT,
    }
}
