use anyhow::Result;
use chrono::{Duration, Utc};
use odin_search::models::{
    Property, PropertyCategory, PropertyImage, PropertyStatus, PropertyType, Role, User,
};
use odin_search::search::SearchOptions;
use odin_search::{MemoryCatalog, SearchEngine, SearchFilters, SortKey};
use std::sync::Arc;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🏠 ODIN Search - Property Search Engine Demo");
    info!("============================================");
    info!("");

    let catalog = Arc::new(MemoryCatalog::new());
    seed(&catalog)?;
    let engine = SearchEngine::new(catalog.clone());

    // Search 1: available apartments for sale in Madrid under 400k
    let filters = SearchFilters {
        property_type: Some(PropertyType::Apartment),
        category: Some(PropertyCategory::Sale),
        status: Some(PropertyStatus::Available),
        max_price: Some(400_000),
        city: Some("Madrid".to_string()),
        ..Default::default()
    };
    let options = SearchOptions {
        page_size: Some(5),
        record_views: true,
        ..Default::default()
    };

    info!("Searching: available apartments for sale in Madrid, up to 400 000 EUR");
    let page = engine.search(&filters, &options).await?;
    for (i, item) in page.items.iter().enumerate() {
        let p = &item.property;
        println!("{}. {} ({} {})", i + 1, p.title, p.price, p.currency);
        println!("   {} · {}, {}", p.address, p.city, p.province);
        if let (Some(beds), Some(baths)) = (p.bedrooms, p.bathrooms) {
            println!("   {} bed, {} bath", beds, baths);
        }
        let views = catalog.views_of(&p.id).unwrap_or(p.views);
        println!("   Agent: {} · views now {}", item.owner.email, views);
        println!();
    }
    info!(
        "Page of {} (has_more: {}, total ≈ {:?})",
        page.items.len(),
        page.has_more,
        page.total_approx
    );

    // Search 2: walk every page of the full catalog, cheapest first
    info!("");
    info!("Paginating the whole catalog by price ascending...");
    let all = SearchFilters::default();
    let mut cursor = None;
    let mut page_no = 0;
    loop {
        let next = engine
            .search(
                &all,
                &SearchOptions {
                    cursor,
                    page_size: Some(3),
                    sort: Some(SortKey::PriceAsc),
                    ..Default::default()
                },
            )
            .await?;
        page_no += 1;
        let ids: Vec<&str> = next.items.iter().map(|v| v.property.id.as_str()).collect();
        println!("page {}: {:?}", page_no, ids);
        if !next.has_more {
            break;
        }
        cursor = next.next_cursor;
    }

    // Save the first page for inspection
    let json = serde_json::to_string_pretty(&page)?;
    tokio::fs::write("search_results.json", json).await?;
    info!("💾 Saved first result page to search_results.json");

    Ok(())
}

/// Seed a handful of listings and their owning agents.
fn seed(catalog: &MemoryCatalog) -> Result<()> {
    let now = Utc::now();
    for (id, email) in [("u1", "ana@odin.example"), ("u2", "bruno@odin.example")] {
        catalog.upsert_user(User {
            id: id.to_string(),
            email: email.to_string(),
            name: None,
            role: Role::Agent,
            created_at: now,
            updated_at: now,
        });
    }

    let seeds: [(&str, &str, PropertyType, i64, bool, Option<u32>, &str); 6] = [
        ("p1", "Bright attic flat", PropertyType::Apartment, 325_000, true, Some(2), "u1"),
        ("p2", "Canal-side duplex", PropertyType::Duplex, 510_000, false, Some(3), "u1"),
        ("p3", "Compact studio", PropertyType::Studio, 180_000, false, Some(1), "u2"),
        ("p4", "Family house with garden", PropertyType::House, 640_000, false, Some(4), "u2"),
        ("p5", "Renovated apartment", PropertyType::Apartment, 298_000, false, Some(2), "u2"),
        ("p6", "Penthouse over the park", PropertyType::Penthouse, 890_000, true, Some(3), "u1"),
    ];

    for (i, (id, title, property_type, price, featured, bedrooms, owner)) in
        seeds.into_iter().enumerate()
    {
        let created_at = now - Duration::days(6 - i as i64);
        catalog.upsert_property(Property {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            price,
            currency: "EUR".to_string(),
            property_type,
            category: PropertyCategory::Sale,
            status: PropertyStatus::Available,
            address: format!("Calle Ejemplo {}", i + 1),
            city: "Madrid".to_string(),
            province: "Madrid".to_string(),
            postal_code: "28001".to_string(),
            coordinates: None,
            bedrooms,
            bathrooms: bedrooms.map(|b| b.saturating_sub(1).max(1)),
            area: bedrooms.map(|b| 35 + 25 * b),
            year_built: Some(1990 + i as i32 * 5),
            features: vec!["elevator".to_string()],
            ai_description: None,
            ai_valuation: Some(price + 12_000),
            images: vec![PropertyImage {
                id: format!("{id}-img0"),
                url: format!("https://img.odin.example/{id}/0.jpg"),
                alt: Some(title.to_string()),
                order: 0,
                property_id: id.to_string(),
                created_at,
            }],
            virtual_tour: None,
            featured,
            views: 0,
            created_at,
            updated_at: created_at,
            owner_id: owner.to_string(),
        })?;
    }
    Ok(())
}
