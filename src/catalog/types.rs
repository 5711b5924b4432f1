use serde::{Deserialize, Serialize};

/// Search parameters for the location catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free text matched against title, address and amenities
    pub q: Option<String>,
    /// Main category, subcategory or slug
    pub category: Option<String>,
    /// City as extracted from the address
    pub city: Option<String>,
    /// Minimum hourly price
    pub min_price: Option<f64>,
    /// Maximum hourly price
    pub max_price: Option<f64>,
    /// Only locations bookable without host approval
    pub instant: Option<bool>,
    /// Required amenity tag
    pub amenity: Option<String>,
}

/// Aggregated viewer ratings of one location
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: usize,
}

/// Price of booking a location for a number of hours
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingQuote {
    pub location_id: String,
    pub hours: u32,
    pub hourly_price: f64,
    pub total: f64,
    /// Without instant booking the host has to approve the request
    pub requires_approval: bool,
}
