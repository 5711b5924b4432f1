pub mod seed;
pub mod types;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::display::extract_city_from_address;
use crate::models::{Location, Viewer};
use crate::taxonomy::{format_category_name, main_category, main_category_of, slugify};

pub use types::{BookingQuote, RatingSummary, SearchParams};

pub const MIN_BOOKING_HOURS: u32 = 1;
pub const MAX_BOOKING_HOURS: u32 = 24;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("Location {0} not found")]
    UnknownLocation(String),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidScore(u8),

    #[error("Bookings must last between 1 and 24 hours, got {0}")]
    InvalidHours(u32),
}

/// Read-only location catalog plus viewer ratings
pub struct Catalog {
    locations: Vec<Location>,
    /// location id → viewer id → score
    ratings: RwLock<HashMap<String, HashMap<String, u8>>>,
}

impl Catalog {
    pub fn new(locations: Vec<Location>) -> Self {
        Self {
            locations,
            ratings: RwLock::new(HashMap::new()),
        }
    }

    /// Catalog backed by the built-in demo data
    pub fn demo() -> Self {
        Self::new(seed::demo_locations())
    }

    /// Load a JSON array of locations, or the demo catalog when no path is given.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::demo());
        };

        info!("Loading catalog from {}", path.display());
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        let locations: Vec<Location> =
            serde_json::from_str(&json).context("Failed to parse catalog file")?;
        info!("💾 Loaded {} locations", locations.len());

        Ok(Self::new(locations))
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn all(&self) -> &[Location] {
        &self.locations
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|location| location.id == id)
    }

    /// Locations for the given ids, in the order requested; unknown ids are skipped
    pub fn find_many<S: AsRef<str>>(&self, ids: &[S]) -> Vec<Location> {
        ids.iter()
            .filter_map(|id| self.get(id.as_ref()))
            .cloned()
            .collect()
    }

    pub fn search(&self, params: &SearchParams) -> Vec<Location> {
        let results: Vec<Location> = self
            .locations
            .iter()
            .filter(|location| matches(location, params))
            .cloned()
            .collect();
        debug!("Search {:?} matched {} locations", params, results.len());
        results
    }

    pub async fn rate(&self, viewer: &Viewer, id: &str, score: u8) -> Result<RatingSummary, CatalogError> {
        if !(1..=5).contains(&score) {
            return Err(CatalogError::InvalidScore(score));
        }
        if self.get(id).is_none() {
            return Err(CatalogError::UnknownLocation(id.to_string()));
        }

        let mut ratings = self.ratings.write().await;
        let scores = ratings.entry(id.to_string()).or_default();
        scores.insert(viewer.id.clone(), score);
        Ok(summarize(scores))
    }

    pub async fn rating(&self, id: &str) -> Result<RatingSummary, CatalogError> {
        if self.get(id).is_none() {
            return Err(CatalogError::UnknownLocation(id.to_string()));
        }

        let ratings = self.ratings.read().await;
        Ok(ratings.get(id).map_or(
            RatingSummary { average: None, count: 0 },
            summarize,
        ))
    }

    pub fn quote(&self, id: &str, hours: u32) -> Result<BookingQuote, CatalogError> {
        let location = self
            .get(id)
            .ok_or_else(|| CatalogError::UnknownLocation(id.to_string()))?;
        if !(MIN_BOOKING_HOURS..=MAX_BOOKING_HOURS).contains(&hours) {
            return Err(CatalogError::InvalidHours(hours));
        }

        Ok(BookingQuote {
            location_id: location.id.clone(),
            hours,
            hourly_price: location.price,
            total: location.price * f64::from(hours),
            requires_approval: !location.instant_booking,
        })
    }
}

fn summarize(scores: &HashMap<String, u8>) -> RatingSummary {
    if scores.is_empty() {
        return RatingSummary { average: None, count: 0 };
    }
    let total: u32 = scores.values().map(|&score| u32::from(score)).sum();
    RatingSummary {
        average: Some(f64::from(total) / scores.len() as f64),
        count: scores.len(),
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches(location: &Location, params: &SearchParams) -> bool {
    if let Some(q) = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let hit = contains_ignore_case(&location.title, q)
            || contains_ignore_case(&location.address, q)
            || location.amenities.iter().any(|amenity| contains_ignore_case(amenity, q));
        if !hit {
            return false;
        }
    }

    if let Some(category) = params.category.as_deref().filter(|c| !c.trim().is_empty()) {
        let property_type = location.property_type.as_deref();
        let hit = match main_category(category) {
            Some(main) => property_type.and_then(main_category_of) == Some(main.name),
            None => slugify(&format_category_name(property_type)) == slugify(category),
        };
        if !hit {
            return false;
        }
    }

    if let Some(city) = params.city.as_deref().filter(|c| !c.trim().is_empty()) {
        if !extract_city_from_address(&location.address).eq_ignore_ascii_case(city.trim()) {
            return false;
        }
    }

    if params.min_price.is_some_and(|min| location.price < min) {
        return false;
    }
    if params.max_price.is_some_and(|max| location.price > max) {
        return false;
    }
    if params.instant.is_some_and(|instant| location.instant_booking != instant) {
        return false;
    }

    if let Some(amenity) = params.amenity.as_deref().filter(|a| !a.trim().is_empty()) {
        if !location
            .amenities
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(amenity.trim()))
        {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(locations: &[Location]) -> Vec<&str> {
        locations.iter().map(|location| location.id.as_str()).collect()
    }

    #[test]
    fn search_by_main_category_ok() {
        let catalog = Catalog::demo();
        let params = SearchParams {
            category: Some("residential".to_string()),
            ..Default::default()
        };
        assert_eq!(
            ids(&catalog.search(&params)),
            vec!["loc_arts_district_loft", "loc_malibu_beach_house"],
        );
    }

    #[test]
    fn search_by_subcategory_ok() {
        let catalog = Catalog::demo();
        let params = SearchParams {
            category: Some("Photo Studio".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&catalog.search(&params)), vec!["loc_silver_lake_studio"]);
    }

    #[test]
    fn search_combined_filters_ok() {
        let catalog = Catalog::demo();
        let params = SearchParams {
            city: Some("los angeles".to_string()),
            max_price: Some(200.0),
            instant: Some(true),
            ..Default::default()
        };
        assert_eq!(
            ids(&catalog.search(&params)),
            vec!["loc_arts_district_loft", "loc_silver_lake_studio"],
        );
    }

    #[test]
    fn search_text_matches_amenities() {
        let catalog = Catalog::demo();
        let params = SearchParams {
            q: Some("cyclorama".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&catalog.search(&params)), vec!["loc_silver_lake_studio"]);
    }

    #[test]
    fn find_many_keeps_request_order() {
        let catalog = Catalog::demo();
        let found = catalog.find_many(&["loc_dtla_rooftop", "missing", "loc_arts_district_loft"]);
        assert_eq!(ids(&found), vec!["loc_dtla_rooftop", "loc_arts_district_loft"]);
    }

    #[tokio::test]
    async fn rate_replaces_previous_score() {
        let catalog = Catalog::demo();
        let viewer = Viewer::new("v1");
        catalog.rate(&viewer, "loc_dtla_rooftop", 2).await.unwrap();
        catalog.rate(&Viewer::new("v2"), "loc_dtla_rooftop", 5).await.unwrap();
        let summary = catalog.rate(&viewer, "loc_dtla_rooftop", 4).await.unwrap();
        assert_eq!(summary, RatingSummary { average: Some(4.5), count: 2 });
    }

    #[tokio::test]
    async fn rate_rejects_bad_input() {
        let catalog = Catalog::demo();
        let viewer = Viewer::new("v1");
        assert_eq!(
            catalog.rate(&viewer, "loc_dtla_rooftop", 6).await,
            Err(CatalogError::InvalidScore(6)),
        );
        assert_eq!(
            catalog.rate(&viewer, "nope", 3).await,
            Err(CatalogError::UnknownLocation("nope".to_string())),
        );
        assert_eq!(
            catalog.rating("loc_dtla_rooftop").await,
            Ok(RatingSummary { average: None, count: 0 }),
        );
    }

    #[test]
    fn quote_ok() {
        let catalog = Catalog::demo();
        let quote = catalog.quote("loc_vernon_warehouse", 3).unwrap();
        assert_eq!(quote.total, 750.0);
        assert!(quote.requires_approval);
        assert_eq!(
            catalog.quote("loc_vernon_warehouse", 0),
            Err(CatalogError::InvalidHours(0)),
        );
    }

    #[tokio::test]
    async fn load_without_path_uses_demo() {
        let catalog = Catalog::load(None).await.unwrap();
        assert_eq!(catalog.len(), seed::demo_locations().len());
    }
}
