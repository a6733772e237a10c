use crate::catalog::traits::{
    CatalogError, CatalogResult, CatalogStore, OrderHint, ScanFilter, ScanPage, ScanRequest,
};
use crate::models::{ModelError, Property, User};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tracing::debug;

/// In-memory catalog store backing the demo binary and the test suite.
/// A real deployment would put a database behind [`CatalogStore`] instead.
pub struct MemoryCatalog {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    properties: HashMap<String, Property>,
    users: HashMap<String, User>,
    /// Request ids already applied, so retried view increments are no-ops
    applied_view_requests: HashSet<String>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Insert or replace a property after validating its record invariants.
    pub fn upsert_property(&self, property: Property) -> Result<(), ModelError> {
        property.validate()?;
        let mut inner = self.inner.write().unwrap();
        inner.properties.insert(property.id.clone(), property);
        Ok(())
    }

    pub fn upsert_user(&self, user: User) {
        let mut inner = self.inner.write().unwrap();
        inner.users.insert(user.id.clone(), user);
    }

    pub fn remove_property(&self, id: &str) -> bool {
        let mut inner = self.inner.write().unwrap();
        inner.properties.remove(id).is_some()
    }

    /// Current view count for a property, for tests and the demo output.
    pub fn views_of(&self, id: &str) -> Option<u64> {
        let inner = self.inner.read().unwrap();
        inner.properties.get(id).map(|p| p.views)
    }

    fn sort_for_hint(items: &mut [Property], order: OrderHint) {
        match order {
            OrderHint::Id => items.sort_by(|a, b| a.id.cmp(&b.id)),
            OrderHint::CreatedAtDesc => items.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            }),
            OrderHint::PriceAsc => {
                items.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.id.cmp(&b.id)))
            }
            OrderHint::PriceDesc => {
                items.sort_by(|a, b| b.price.cmp(&a.price).then_with(|| a.id.cmp(&b.id)))
            }
        }
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn fetch_by_id(&self, id: &str) -> CatalogResult<Option<Property>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.properties.get(id).cloned())
    }

    async fn fetch_user(&self, id: &str) -> CatalogResult<Option<User>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.get(id).cloned())
    }

    async fn scan(&self, req: ScanRequest) -> CatalogResult<ScanPage> {
        let mut matched: Vec<Property> = {
            let inner = self.inner.read().unwrap();
            inner
                .properties
                .values()
                .filter(|p| req.filter.matches(p))
                .cloned()
                .collect()
        };
        Self::sort_for_hint(&mut matched, req.order);

        // Continuation token is a plain offset into the hinted order;
        // opaque to the engine, which never inspects it.
        let offset = match &req.token {
            Some(t) => t
                .parse::<usize>()
                .map_err(|_| CatalogError::Unavailable(format!("bad scan token: {t}")))?,
            None => 0,
        };

        let end = offset.saturating_add(req.limit).min(matched.len());
        let items = if offset < matched.len() {
            matched[offset..end].to_vec()
        } else {
            Vec::new()
        };
        let next_token = if end < matched.len() {
            Some(end.to_string())
        } else {
            None
        };

        debug!(
            offset,
            returned = items.len(),
            has_next = next_token.is_some(),
            "memory catalog scan"
        );
        Ok(ScanPage { items, next_token })
    }

    async fn record_views(&self, ids: &[String], request_id: &str) -> CatalogResult<()> {
        let mut inner = self.inner.write().unwrap();
        if !inner.applied_view_requests.insert(request_id.to_string()) {
            debug!(request_id, "duplicate view request ignored");
            return Ok(());
        }
        for id in ids {
            if let Some(p) = inner.properties.get_mut(id) {
                p.views += 1;
            }
        }
        Ok(())
    }

    async fn estimate_total(&self, filter: &ScanFilter) -> CatalogResult<Option<usize>> {
        let inner = self.inner.read().unwrap();
        let count = inner.properties.values().filter(|p| filter.matches(p)).count();
        Ok(Some(count))
    }
}
