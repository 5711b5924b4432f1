use async_trait::async_trait;
use thiserror::Error;

use crate::models::GeoPoint;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("No results for address")]
    NoResults,

    #[error("Invalid coordinate in geocoder response: {0}")]
    InvalidCoordinate(String),

    #[error("Geocoder request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Common trait for address → coordinate lookups
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a free-text address
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError>;

    /// Get the name of the geocoding provider
    fn provider_name(&self) -> &'static str;
}
