use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Core bookable venue record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub title: String,
    /// Free text, comma-delimited with the city as the second segment
    pub address: String,
    /// Price per hour
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Either a plain category key or a composite "Main - Sub" string
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub instant_booking: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Static category entry exposed to clients
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PropertyCategory {
    /// Slugified subcategory name
    pub id: String,
    pub name: String,
    pub main_category: String,
    pub subcategory: String,
    pub icon: String,
}

/// Authenticated viewer of the marketplace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Viewer {
    pub id: String,
}

impl Viewer {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
