use crate::models::{Property, PropertyCategory, PropertyStatus, PropertyType};
use crate::search::error::{SearchError, SearchResult};
use crate::search::types::{RankSpec, SearchFilters, SortKey};

/// One conjunctive filter clause over a property
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    TypeEq(PropertyType),
    CategoryEq(PropertyCategory),
    StatusEq(PropertyStatus),
    /// Inclusive bounds; at least one side is set
    PriceRange {
        min: Option<i64>,
        max: Option<i64>,
    },
    BedroomsAtLeast(u32),
    BathroomsAtLeast(u32),
    /// Inclusive bounds on area; a property without an area never matches
    AreaRange {
        min: Option<u32>,
        max: Option<u32>,
    },
    /// Lowercased at compile time for case-insensitive comparison
    CityEq(String),
    ProvinceEq(String),
    /// Every listed tag must be present on the property; tags are
    /// lowercased at compile time like the location clauses
    FeatureSubset(Vec<String>),
}

impl Clause {
    /// Evaluate this clause against a property. Absent optional fields
    /// fail range clauses: absence is not zero.
    pub fn matches(&self, p: &Property) -> bool {
        match self {
            Clause::TypeEq(t) => p.property_type == *t,
            Clause::CategoryEq(c) => p.category == *c,
            Clause::StatusEq(s) => p.status == *s,
            Clause::PriceRange { min, max } => {
                min.map_or(true, |m| p.price >= m) && max.map_or(true, |m| p.price <= m)
            }
            Clause::BedroomsAtLeast(n) => p.bedrooms.map_or(false, |b| b >= *n),
            Clause::BathroomsAtLeast(n) => p.bathrooms.map_or(false, |b| b >= *n),
            Clause::AreaRange { min, max } => match p.area {
                None => false,
                Some(a) => min.map_or(true, |m| a >= m) && max.map_or(true, |m| a <= m),
            },
            Clause::CityEq(city) => p.city.to_lowercase() == *city,
            Clause::ProvinceEq(province) => p.province.to_lowercase() == *province,
            Clause::FeatureSubset(wanted) => wanted
                .iter()
                .all(|w| p.features.iter().any(|f| f.to_lowercase() == *w)),
        }
    }

    /// Coarse selectivity class used by the planner to order evaluation:
    /// lower runs earlier. Closed-enum equalities are cheapest and usually
    /// most selective; the feature subset scan is the most expensive.
    pub fn selectivity_class(&self) -> u8 {
        match self {
            Clause::StatusEq(_) | Clause::CategoryEq(_) | Clause::TypeEq(_) => 0,
            Clause::CityEq(_) | Clause::ProvinceEq(_) => 1,
            Clause::BedroomsAtLeast(_) | Clause::BathroomsAtLeast(_) => 2,
            Clause::PriceRange { .. } | Clause::AreaRange { .. } => 3,
            Clause::FeatureSubset(_) => 4,
        }
    }
}

/// A compiled conjunction of clauses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    pub clauses: Vec<Clause>,
}

impl Predicate {
    pub fn matches(&self, p: &Property) -> bool {
        self.clauses.iter().all(|c| c.matches(p))
    }
}

/// Compile search filters into a predicate and a rank spec. Pure; performs
/// no store access. Range preconditions are surfaced as `InvalidFilter`,
/// never silently repaired.
pub fn compile(
    filters: &SearchFilters,
    sort: Option<SortKey>,
    featured_first: bool,
) -> SearchResult<(Predicate, RankSpec)> {
    if let (Some(min), Some(max)) = (filters.min_price, filters.max_price) {
        if min > max {
            return Err(SearchError::InvalidFilter(format!(
                "min_price {min} exceeds max_price {max}"
            )));
        }
    }
    if let (Some(min), Some(max)) = (filters.min_area, filters.max_area) {
        if min > max {
            return Err(SearchError::InvalidFilter(format!(
                "min_area {min} exceeds max_area {max}"
            )));
        }
    }

    let mut clauses = Vec::new();
    if let Some(t) = filters.property_type {
        clauses.push(Clause::TypeEq(t));
    }
    if let Some(c) = filters.category {
        clauses.push(Clause::CategoryEq(c));
    }
    if let Some(s) = filters.status {
        clauses.push(Clause::StatusEq(s));
    }
    if filters.min_price.is_some() || filters.max_price.is_some() {
        clauses.push(Clause::PriceRange {
            min: filters.min_price,
            max: filters.max_price,
        });
    }
    if let Some(n) = filters.bedrooms {
        clauses.push(Clause::BedroomsAtLeast(n));
    }
    if let Some(n) = filters.bathrooms {
        clauses.push(Clause::BathroomsAtLeast(n));
    }
    if filters.min_area.is_some() || filters.max_area.is_some() {
        clauses.push(Clause::AreaRange {
            min: filters.min_area,
            max: filters.max_area,
        });
    }
    if let Some(city) = &filters.city {
        clauses.push(Clause::CityEq(city.to_lowercase()));
    }
    if let Some(province) = &filters.province {
        clauses.push(Clause::ProvinceEq(province.to_lowercase()));
    }
    if !filters.features.is_empty() {
        clauses.push(Clause::FeatureSubset(
            filters.features.iter().map(|f| f.to_lowercase()).collect(),
        ));
    }

    let rank = RankSpec {
        featured_first,
        key: sort.unwrap_or_default(),
    };
    Ok((Predicate { clauses }, rank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Property;
    use chrono::{TimeZone, Utc};

    fn listing(id: &str) -> Property {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Property {
            id: id.to_string(),
            title: String::new(),
            description: String::new(),
            price: 200_000,
            currency: "EUR".to_string(),
            property_type: PropertyType::Apartment,
            category: PropertyCategory::Sale,
            status: PropertyStatus::Available,
            address: String::new(),
            city: "Madrid".to_string(),
            province: "Madrid".to_string(),
            postal_code: String::new(),
            coordinates: None,
            bedrooms: Some(3),
            bathrooms: Some(2),
            area: None,
            year_built: None,
            features: vec!["pool".to_string(), "garage".to_string()],
            ai_description: None,
            ai_valuation: None,
            images: vec![],
            virtual_tour: None,
            featured: false,
            views: 0,
            created_at: at,
            updated_at: at,
            owner_id: "u1".to_string(),
        }
    }

    #[test]
    fn empty_filters_compile_to_empty_predicate() {
        let (pred, rank) = compile(&SearchFilters::default(), None, true).unwrap();
        assert!(pred.clauses.is_empty());
        assert!(pred.matches(&listing("p1")));
        assert_eq!(rank, RankSpec::default());
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let filters = SearchFilters {
            min_price: Some(500),
            max_price: Some(100),
            ..Default::default()
        };
        assert!(matches!(
            compile(&filters, None, true),
            Err(SearchError::InvalidFilter(_))
        ));
    }

    #[test]
    fn inverted_area_range_is_rejected() {
        let filters = SearchFilters {
            min_area: Some(90),
            max_area: Some(50),
            ..Default::default()
        };
        assert!(matches!(
            compile(&filters, None, true),
            Err(SearchError::InvalidFilter(_))
        ));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let clause = Clause::PriceRange {
            min: Some(200_000),
            max: Some(200_000),
        };
        assert!(clause.matches(&listing("p1")));
    }

    #[test]
    fn missing_area_never_matches_area_filter() {
        let clause = Clause::AreaRange {
            min: None,
            max: Some(1_000_000),
        };
        // listing has area: None, and absence is not zero
        assert!(!clause.matches(&listing("p1")));
    }

    #[test]
    fn bedrooms_filter_means_at_least() {
        let p = listing("p1"); // 3 bedrooms
        assert!(Clause::BedroomsAtLeast(2).matches(&p));
        assert!(Clause::BedroomsAtLeast(3).matches(&p));
        assert!(!Clause::BedroomsAtLeast(4).matches(&p));
    }

    #[test]
    fn missing_bedrooms_fails_bedrooms_filter() {
        let mut p = listing("p1");
        p.bedrooms = None;
        assert!(!Clause::BedroomsAtLeast(1).matches(&p));
    }

    #[test]
    fn city_match_is_case_insensitive() {
        let filters = SearchFilters {
            city: Some("mAdRiD".to_string()),
            ..Default::default()
        };
        let (pred, _) = compile(&filters, None, true).unwrap();
        assert!(pred.matches(&listing("p1")));
    }

    #[test]
    fn feature_filter_is_subset_match() {
        let p = listing("p1"); // pool, garage
        assert!(Clause::FeatureSubset(vec!["pool".to_string()]).matches(&p));
        assert!(!Clause::FeatureSubset(vec!["pool".to_string(), "sauna".to_string()]).matches(&p));
    }

    #[test]
    fn feature_match_folds_case_like_the_location_clauses() {
        let mut p = listing("p1");
        p.features = vec!["Ático".to_string()];
        let filters = SearchFilters {
            features: vec!["ÁTICO".to_string()],
            ..Default::default()
        };
        let (pred, _) = compile(&filters, None, true).unwrap();
        assert!(pred.matches(&p));
    }

    #[test]
    fn sort_override_lands_in_rank_spec() {
        let (_, rank) = compile(&SearchFilters::default(), Some(SortKey::PriceAsc), true).unwrap();
        assert!(rank.featured_first);
        assert_eq!(rank.key, SortKey::PriceAsc);
    }
}
