use crate::catalog::CatalogStore;
use crate::models::{Property, User};
use crate::search::error::SearchResult;
use crate::search::types::PropertyView;
use std::collections::HashMap;
use tracing::warn;

/// Hydrate a ranked page: join each property's owner from the store and
/// put images into display order.
///
/// A property whose owner cannot be resolved is a data-integrity fault in
/// the catalog, not a query error: it is logged and dropped from the page
/// so one bad record never fails a whole search. Store-level failures do
/// still abort, per the no-partial-page rule.
pub async fn assemble(
    items: Vec<Property>,
    store: &dyn CatalogStore,
) -> SearchResult<Vec<PropertyView>> {
    // Owners repeat across listings of the same agent; resolve each once.
    let mut owners: HashMap<String, Option<User>> = HashMap::new();
    for p in &items {
        if !owners.contains_key(&p.owner_id) {
            let user = store.fetch_user(&p.owner_id).await?;
            owners.insert(p.owner_id.clone(), user);
        }
    }

    let mut views = Vec::with_capacity(items.len());
    for mut property in items {
        match owners.get(&property.owner_id).and_then(|u| u.clone()) {
            Some(owner) => {
                property.images.sort_by_key(|img| img.order);
                views.push(PropertyView { property, owner });
            }
            None => {
                warn!(
                    property_id = %property.id,
                    owner_id = %property.owner_id,
                    "dropping listing with unresolvable owner"
                );
            }
        }
    }
    Ok(views)
}

/// Best-effort batched view-count increment for an assembled page. Failures
/// are logged, never surfaced; undercounting is acceptable, double-counting
/// a retried request is not, so the store dedupes on `request_id`.
pub async fn record_page_views(
    views: &[PropertyView],
    store: &dyn CatalogStore,
    request_id: &str,
) {
    if views.is_empty() {
        return;
    }
    let ids: Vec<String> = views.iter().map(|v| v.property.id.clone()).collect();
    if let Err(err) = store.record_views(&ids, request_id).await {
        warn!(%err, request_id, "view-count increment failed; undercounting");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::models::{
        PropertyCategory, PropertyImage, PropertyStatus, PropertyType, Role,
    };
    use chrono::{TimeZone, Utc};

    fn user(id: &str) -> User {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        User {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            name: None,
            role: Role::Agent,
            created_at: at,
            updated_at: at,
        }
    }

    fn listing(id: &str, owner_id: &str) -> Property {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Property {
            id: id.to_string(),
            title: String::new(),
            description: String::new(),
            price: 100,
            currency: "EUR".to_string(),
            property_type: PropertyType::House,
            category: PropertyCategory::Sale,
            status: PropertyStatus::Available,
            address: String::new(),
            city: String::new(),
            province: String::new(),
            postal_code: String::new(),
            coordinates: None,
            bedrooms: None,
            bathrooms: None,
            area: None,
            year_built: None,
            features: vec![],
            ai_description: None,
            ai_valuation: None,
            images: vec![],
            virtual_tour: None,
            featured: false,
            views: 0,
            created_at: at,
            updated_at: at,
            owner_id: owner_id.to_string(),
        }
    }

    fn image(id: &str, property_id: &str, order: u32) -> PropertyImage {
        PropertyImage {
            id: id.to_string(),
            url: String::new(),
            alt: None,
            order,
            property_id: property_id.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn unresolvable_owner_drops_item_silently() {
        let store = MemoryCatalog::new();
        store.upsert_user(user("u1"));

        let items = vec![listing("p1", "u1"), listing("p2", "missing")];
        let views = assemble(items, &store).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].property.id, "p1");
        assert_eq!(views[0].owner.id, "u1");
    }

    #[tokio::test]
    async fn images_come_back_in_display_order() {
        let store = MemoryCatalog::new();
        store.upsert_user(user("u1"));

        let mut p = listing("p1", "u1");
        p.images = vec![image("i2", "p1", 2), image("i0", "p1", 0), image("i1", "p1", 1)];
        let views = assemble(vec![p], &store).await.unwrap();
        let orders: Vec<u32> = views[0].property.images.iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn record_page_views_hits_each_item_once() {
        let store = MemoryCatalog::new();
        store.upsert_user(user("u1"));
        store.upsert_property(listing("p1", "u1")).unwrap();
        store.upsert_property(listing("p2", "u1")).unwrap();

        let items = vec![listing("p1", "u1"), listing("p2", "u1")];
        let views = assemble(items, &store).await.unwrap();
        record_page_views(&views, &store, "req-7").await;

        assert_eq!(store.views_of("p1"), Some(1));
        assert_eq!(store.views_of("p2"), Some(1));
    }
}
