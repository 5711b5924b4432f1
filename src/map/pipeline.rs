use std::collections::HashSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::info_window::render_info_window;
use super::jitter::Jitter;
use super::sdk::MapsSdk;
use super::view::{Bounds, MapView};
use crate::geocoding::{GeocodeError, Geocoder};
use crate::models::{GeoPoint, Location};

pub type MarkerId = u64;

/// A placed marker with its popup markup
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub id: MarkerId,
    pub location_id: String,
    pub title: String,
    pub position: GeoPoint,
    pub info_window: String,
}

/// One lookup of a render pass
#[derive(Debug, Clone)]
pub struct GeocodeRequest {
    pub generation: u64,
    pub location: Location,
}

#[derive(Debug)]
pub struct GeocodeOutcome {
    pub generation: u64,
    pub location: Location,
    pub result: Result<GeoPoint, GeocodeError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Placed(MarkerId),
    /// The address did not resolve
    NoMarker,
    /// The outcome belongs to a superseded pass, or was already applied
    Stale,
}

/// Serializable state of the map after a render pass
#[derive(Debug, Clone, Serialize)]
pub struct MapSnapshot {
    pub view: MapView,
    pub markers: Vec<Marker>,
    pub open_marker: Option<MarkerId>,
}

/// Turns location lists into markers on a single map.
///
/// Each pass replaces every marker. Lookups run concurrently and are matched
/// back by pass generation and location id, so results of an older pass are
/// dropped. Once the last lookup of the current pass lands, the view is fitted
/// to all placed markers.
pub struct MarkerPipeline {
    sdk: Arc<MapsSdk>,
    jitter: Jitter,
    rng: StdRng,
    view: Option<MapView>,
    markers: Vec<Marker>,
    open_marker: Option<MarkerId>,
    generation: u64,
    pending: HashSet<String>,
    next_marker_id: MarkerId,
}

impl MarkerPipeline {
    pub fn new(sdk: Arc<MapsSdk>) -> Self {
        Self::with_rng(sdk, StdRng::from_entropy())
    }

    pub fn with_rng(sdk: Arc<MapsSdk>, rng: StdRng) -> Self {
        Self {
            sdk,
            jitter: Jitter::default(),
            rng,
            view: None,
            markers: Vec::new(),
            open_marker: None,
            generation: 0,
            pending: HashSet::new(),
            next_marker_id: 1,
        }
    }

    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn view(&self) -> Option<&MapView> {
        self.view.as_ref()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All lookups of the current pass have landed
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }

    /// Start a new pass: drop every marker, move the map, and list the lookups to run.
    pub fn begin_pass(&mut self, locations: &[Location], center: GeoPoint, zoom: u8) -> Vec<GeocodeRequest> {
        match self.view.as_mut() {
            Some(view) => view.update(center, zoom),
            None => {
                info!("Creating map at {},{} zoom {zoom}", center.lat, center.lng);
                self.view = Some(MapView::new(center, zoom));
            }
        }

        debug!("Removing {} markers", self.markers.len());
        self.markers.clear();
        self.open_marker = None;
        self.pending.clear();
        self.generation += 1;

        let generation = self.generation;
        let mut requests = Vec::new();
        for location in locations {
            if location.address.trim().is_empty() {
                debug!(location_id = %location.id, "Skipping location without address");
                continue;
            }
            if self.pending.insert(location.id.clone()) {
                requests.push(GeocodeRequest {
                    generation,
                    location: location.clone(),
                });
            }
        }
        requests
    }

    /// Apply one lookup result; fits the view when it was the last one of the pass.
    pub fn apply(&mut self, outcome: GeocodeOutcome) -> Applied {
        if outcome.generation != self.generation || !self.pending.remove(&outcome.location.id) {
            debug!(location_id = %outcome.location.id, "Dropping stale geocode result");
            return Applied::Stale;
        }

        let applied = match outcome.result {
            Ok(point) => {
                let position = self.jitter.apply(point, &mut self.rng);
                Applied::Placed(self.place(&outcome.location, position))
            }
            Err(error) => {
                debug!(location_id = %outcome.location.id, "Geocoding failed: {error}");
                Applied::NoMarker
            }
        };

        if self.pending.is_empty() {
            self.fit_to_markers();
        }
        applied
    }

    /// Run a whole pass and wait for every lookup.
    pub async fn render(&mut self, locations: &[Location], center: GeoPoint, zoom: u8) -> MapSnapshot {
        let requests = self.begin_pass(locations, center, zoom);
        let mut lookups = spawn_lookups(self.sdk.geocoder(), requests);

        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok(outcome) => {
                    self.apply(outcome);
                }
                Err(error) => warn!("Geocoding task failed: {error}"),
            }
        }

        if !self.is_settled() {
            self.pending.clear();
            self.fit_to_markers();
        }

        info!("Placed {} of {} markers", self.markers.len(), locations.len());
        self.snapshot(center, zoom)
    }

    /// Open a marker's popup, closing whichever one was open.
    pub fn activate(&mut self, marker_id: MarkerId) -> Option<&Marker> {
        let index = self.markers.iter().position(|marker| marker.id == marker_id)?;
        if let Some(open) = self.open_marker.replace(marker_id) {
            debug!("Closing info window of marker {open}");
        }
        self.markers.get(index)
    }

    pub fn open_info_window(&self) -> Option<&Marker> {
        let open = self.open_marker?;
        self.markers.iter().find(|marker| marker.id == open)
    }

    pub fn close_info_window(&mut self) {
        self.open_marker = None;
    }

    fn place(&mut self, location: &Location, position: GeoPoint) -> MarkerId {
        let id = self.next_marker_id;
        self.next_marker_id += 1;
        self.markers.push(Marker {
            id,
            location_id: location.id.clone(),
            title: location.title.clone(),
            position,
            info_window: render_info_window(location),
        });
        id
    }

    fn fit_to_markers(&mut self) {
        let Some(bounds) = Bounds::from_points(self.markers.iter().map(|marker| marker.position)) else {
            return;
        };
        if let Some(view) = self.view.as_mut() {
            view.fit_bounds(bounds, self.sdk.viewport(), self.sdk.max_zoom());
        }
    }

    fn snapshot(&self, center: GeoPoint, zoom: u8) -> MapSnapshot {
        MapSnapshot {
            view: self.view.clone().unwrap_or_else(|| MapView::new(center, zoom)),
            markers: self.markers.clone(),
            open_marker: self.open_marker,
        }
    }
}

/// Fan the lookups out; results come back in completion order.
pub fn spawn_lookups(geocoder: Arc<dyn Geocoder>, requests: Vec<GeocodeRequest>) -> JoinSet<GeocodeOutcome> {
    let mut lookups = JoinSet::new();
    for request in requests {
        let geocoder = geocoder.clone();
        lookups.spawn(async move {
            let result = geocoder.geocode(&request.location.address).await;
            GeocodeOutcome {
                generation: request.generation,
                location: request.location,
                result,
            }
        });
    }
    lookups
}
