use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a platform user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Agent,
    Admin,
}

/// A platform user. The search core treats users as read-only input;
/// it never mutates roles or credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kind of property
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Apartment,
    House,
    Villa,
    Townhouse,
    Penthouse,
    Studio,
    Duplex,
    Commercial,
    Office,
    Warehouse,
    Land,
}

/// Listing category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyCategory {
    Sale,
    Rent,
    VacationRental,
}

/// Lifecycle status of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    Available,
    Sold,
    Rented,
    Reserved,
    UnderConstruction,
}

/// Geographic coordinates. Latitude and longitude always travel together;
/// a property either has both or neither.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// An image belonging to exactly one property. `order` is a dense rank
/// within the owning property's image set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyImage {
    pub id: String,
    pub url: String,
    pub alt: Option<String>,
    pub order: u32,
    pub property_id: String,
    pub created_at: DateTime<Utc>,
}

/// Core property listing model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub currency: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub category: PropertyCategory,
    pub status: PropertyStatus,

    // Location
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub coordinates: Option<GeoPoint>,

    // Details
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub area: Option<u32>,
    pub year_built: Option<i32>,
    pub features: Vec<String>,

    // AI generated (consumed as-is, never produced here)
    pub ai_description: Option<String>,
    pub ai_valuation: Option<i64>,

    // Media
    pub images: Vec<PropertyImage>,
    pub virtual_tour: Option<String>,

    // Metadata
    pub featured: bool,
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Relations
    pub owner_id: String,
}

/// Validation failures for domain records
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("property {id}: price must be non-negative, got {price}")]
    NegativePrice { id: String, price: i64 },
    #[error("property {id}: ai_valuation must be non-negative, got {valuation}")]
    NegativeValuation { id: String, valuation: i64 },
    #[error("property {id}: created_at is after updated_at")]
    TimestampsReversed { id: String },
    #[error("property {id}: image order must be dense and unique starting at 0")]
    ImageOrderNotDense { id: String },
    #[error("image {image_id} does not belong to property {property_id}")]
    ForeignImage {
        image_id: String,
        property_id: String,
    },
}

impl Property {
    /// Check the record-level invariants a catalog must uphold before
    /// accepting a listing: non-negative money fields, ordered timestamps,
    /// and a dense, unique image order (0, 1, 2, ...).
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.price < 0 {
            return Err(ModelError::NegativePrice {
                id: self.id.clone(),
                price: self.price,
            });
        }
        if let Some(v) = self.ai_valuation {
            if v < 0 {
                return Err(ModelError::NegativeValuation {
                    id: self.id.clone(),
                    valuation: v,
                });
            }
        }
        if self.created_at > self.updated_at {
            return Err(ModelError::TimestampsReversed {
                id: self.id.clone(),
            });
        }
        for image in &self.images {
            if image.property_id != self.id {
                return Err(ModelError::ForeignImage {
                    image_id: image.id.clone(),
                    property_id: self.id.clone(),
                });
            }
        }
        let mut orders: Vec<u32> = self.images.iter().map(|i| i.order).collect();
        orders.sort_unstable();
        for (expected, got) in orders.iter().enumerate() {
            if *got != expected as u32 {
                return Err(ModelError::ImageOrderNotDense {
                    id: self.id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn image(id: &str, property_id: &str, order: u32) -> PropertyImage {
        PropertyImage {
            id: id.to_string(),
            url: format!("https://img.example/{id}.jpg"),
            alt: None,
            order,
            property_id: property_id.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn listing(id: &str) -> Property {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Property {
            id: id.to_string(),
            title: "Test listing".to_string(),
            description: String::new(),
            price: 250_000,
            currency: "EUR".to_string(),
            property_type: PropertyType::Apartment,
            category: PropertyCategory::Sale,
            status: PropertyStatus::Available,
            address: "Calle Mayor 1".to_string(),
            city: "Madrid".to_string(),
            province: "Madrid".to_string(),
            postal_code: "28001".to_string(),
            coordinates: None,
            bedrooms: Some(2),
            bathrooms: Some(1),
            area: Some(80),
            year_built: Some(1998),
            features: vec![],
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
    fn valid_listing_passes() {
        let mut p = listing("p1");
        p.images = vec![image("i1", "p1", 0), image("i2", "p1", 1)];
        assert!(p.validate().is_ok());
    }

    #[test]
    fn negative_price_rejected() {
        let mut p = listing("p1");
        p.price = -1;
        assert!(matches!(p.validate(), Err(ModelError::NegativePrice { .. })));
    }

    #[test]
    fn image_order_must_be_dense() {
        let mut p = listing("p1");
        p.images = vec![image("i1", "p1", 0), image("i2", "p1", 2)];
        assert_eq!(
            p.validate(),
            Err(ModelError::ImageOrderNotDense {
                id: "p1".to_string()
            })
        );
    }

    #[test]
    fn duplicate_image_order_rejected() {
        let mut p = listing("p1");
        p.images = vec![image("i1", "p1", 0), image("i2", "p1", 0)];
        assert!(p.validate().is_err());
    }

    #[test]
    fn foreign_image_rejected() {
        let mut p = listing("p1");
        p.images = vec![image("i1", "other", 0)];
        assert!(matches!(p.validate(), Err(ModelError::ForeignImage { .. })));
    }

    #[test]
    fn reversed_timestamps_rejected() {
        let mut p = listing("p1");
        p.created_at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            p.validate(),
            Err(ModelError::TimestampsReversed { .. })
        ));
    }
}
