use serde::Serialize;

use crate::models::Location;
use crate::taxonomy::{format_category_name, icon_for};

/// Label used when an address yields nothing usable
pub const UNKNOWN_CITY: &str = "Unknown";

/// City part of a free-text address.
///
/// Addresses are expected to look like `"street, city, region"`. This is a
/// heuristic: with a single segment the whole (trimmed) address is returned.
pub fn extract_city_from_address(address: &str) -> String {
    let mut segments = address.split(',');
    let first = segments.next().unwrap_or_default().trim();
    let city = match segments.next() {
        Some(second) => second.trim(),
        None => first,
    };

    if city.is_empty() {
        UNKNOWN_CITY.to_string()
    } else {
        city.to_string()
    }
}

/// Formats an hourly price like `$150/hr` or `$87.50/hr`.
pub fn format_price_per_hour(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("${price:.0}/hr")
    } else {
        format!("${price:.2}/hr")
    }
}

/// Display-ready fields of a location card
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CardSummary {
    pub id: String,
    pub title: String,
    pub city: String,
    pub category: String,
    pub icon: &'static str,
    pub price_label: String,
    pub cover_image: Option<String>,
    pub instant_booking: bool,
}

impl From<&Location> for CardSummary {
    fn from(location: &Location) -> Self {
        let property_type = location.property_type.as_deref();
        Self {
            id: location.id.clone(),
            title: location.title.clone(),
            city: extract_city_from_address(&location.address),
            category: format_category_name(property_type),
            icon: icon_for(property_type),
            price_label: format_price_per_hour(location.price),
            cover_image: location.images.first().cloned(),
            instant_booking: location.instant_booking,
        }
    }
}
