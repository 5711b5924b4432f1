use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::view::Viewport;
use crate::geocoding::{Geocoder, NominatimGeocoder};

pub const DEFAULT_MAX_ZOOM: u8 = 15;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MapError {
    #[error("Maps API key is not configured")]
    MissingApiKey,

    #[error("Failed to load maps: {0}")]
    LoadFailed(String),
}

/// What the maps SDK needs to start
#[derive(Debug, Clone)]
pub struct MapSettings {
    pub api_key: Option<String>,
    pub geocoder_url: String,
    pub max_zoom: u8,
    pub viewport: Viewport,
}

/// Loaded mapping services shared by every render pass
pub struct MapsSdk {
    geocoder: Arc<dyn Geocoder>,
    max_zoom: u8,
    viewport: Viewport,
}

impl MapsSdk {
    pub fn load(settings: &MapSettings) -> Result<Self, MapError> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(MapError::MissingApiKey)?;

        let geocoder = NominatimGeocoder::new(&settings.geocoder_url, api_key)
            .map_err(|error| MapError::LoadFailed(format!("{error:#}")))?;

        Ok(Self::with_geocoder(Arc::new(geocoder), settings.max_zoom, settings.viewport))
    }

    pub fn with_geocoder(geocoder: Arc<dyn Geocoder>, max_zoom: u8, viewport: Viewport) -> Self {
        Self {
            geocoder,
            max_zoom,
            viewport,
        }
    }

    pub fn geocoder(&self) -> Arc<dyn Geocoder> {
        self.geocoder.clone()
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

/// Loads the SDK on first use and remembers the outcome, failures included.
pub struct SdkLoader {
    settings: MapSettings,
    sdk: OnceCell<Result<Arc<MapsSdk>, MapError>>,
    attempts: AtomicUsize,
}

impl SdkLoader {
    pub fn new(settings: MapSettings) -> Self {
        Self {
            settings,
            sdk: OnceCell::new(),
            attempts: AtomicUsize::new(0),
        }
    }

    pub async fn get(&self) -> Result<Arc<MapsSdk>, MapError> {
        self.sdk
            .get_or_init(|| async {
                self.attempts.fetch_add(1, Ordering::SeqCst);
                let loaded = MapsSdk::load(&self.settings).map(Arc::new);
                match &loaded {
                    Ok(sdk) => info!("🗺️ Maps loaded, geocoding via {}", sdk.geocoder.provider_name()),
                    Err(error) => warn!("Maps unavailable: {error}"),
                }
                loaded
            })
            .await
            .clone()
    }

    /// Number of load attempts so far; never more than one
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}
