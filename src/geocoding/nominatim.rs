use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::traits::{GeocodeError, Geocoder};
use crate::models::GeoPoint;

/// One entry of a Nominatim-style `/search?format=json` response
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
}

impl NominatimPlace {
    pub fn point(&self) -> Result<GeoPoint, GeocodeError> {
        let lat = self.lat.parse::<f64>();
        let lng = self.lon.parse::<f64>();
        match (lat, lng) {
            (Ok(lat), Ok(lng)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) => {
                Ok(GeoPoint::new(lat, lng))
            }
            _ => Err(GeocodeError::InvalidCoordinate(format!("{},{}", self.lat, self.lon))),
        }
    }
}

/// Geocoder for Nominatim-compatible HTTP APIs, authenticated with an API key
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("location-market/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create geocoder HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        debug!("Geocoding {address:?}");

        let places: Vec<NominatimPlace> = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", address),
                ("format", "json"),
                ("limit", "1"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        places.first().ok_or(GeocodeError::NoResults)?.point()
    }

    fn provider_name(&self) -> &'static str {
        "Nominatim"
    }
}
