use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::models::GeoPoint;

pub const TILE_SIZE: f64 = 256.0;
pub const MAX_ZOOM_LEVEL: u8 = 21;

/// Smallest span used for zoom math, so single points do not divide by zero
const MIN_FRACTION: f64 = 1e-12;

/// Rendered map size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
        }
    }
}

/// Latitude/longitude rectangle; does not handle the antimeridian
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn from_point(point: GeoPoint) -> Self {
        Self {
            south: point.lat,
            west: point.lng,
            north: point.lat,
            east: point.lng,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = GeoPoint>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut bounds = Self::from_point(points.next()?);
        for point in points {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: GeoPoint) {
        self.south = self.south.min(point.lat);
        self.north = self.north.max(point.lat);
        self.west = self.west.min(point.lng);
        self.east = self.east.max(point.lng);
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.lat) && (self.west..=self.east).contains(&point.lng)
    }

    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        self.contains(GeoPoint::new(other.south, other.west))
            && self.contains(GeoPoint::new(other.north, other.east))
    }

    /// Center in projected (Web Mercator) space
    pub fn center(&self) -> GeoPoint {
        let y = (mercator_y(self.north) + mercator_y(self.south)) / 2.0;
        GeoPoint::new(inverse_mercator_y(y), (self.west + self.east) / 2.0)
    }
}

fn mercator_y(lat: f64) -> f64 {
    let sin = lat.to_radians().sin();
    (((1.0 + sin) / (1.0 - sin)).ln() / 2.0).clamp(-PI, PI)
}

fn inverse_mercator_y(y: f64) -> f64 {
    y.sinh().atan().to_degrees()
}

/// Highest zoom at which `bounds` fits the viewport.
pub fn zoom_for_bounds(bounds: &Bounds, viewport: Viewport) -> u8 {
    let lat_fraction = ((mercator_y(bounds.north) - mercator_y(bounds.south)) / (2.0 * PI)).max(MIN_FRACTION);
    let lng_fraction = ((bounds.east - bounds.west) / 360.0).max(MIN_FRACTION);

    let lat_zoom = (f64::from(viewport.height) / TILE_SIZE / lat_fraction).log2();
    let lng_zoom = (f64::from(viewport.width) / TILE_SIZE / lng_fraction).log2();

    lat_zoom.min(lng_zoom).floor().clamp(0.0, f64::from(MAX_ZOOM_LEVEL)) as u8
}

/// The single map instance: where it looks and how close
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: u8,
    /// Bounds of the last fit, if any
    pub bounds: Option<Bounds>,
}

impl MapView {
    pub fn new(center: GeoPoint, zoom: u8) -> Self {
        Self {
            center,
            zoom: zoom.min(MAX_ZOOM_LEVEL),
            bounds: None,
        }
    }

    pub fn update(&mut self, center: GeoPoint, zoom: u8) {
        self.center = center;
        self.zoom = zoom.min(MAX_ZOOM_LEVEL);
        self.bounds = None;
    }

    /// Center on `bounds` at the closest zoom showing all of it, but never past `max_zoom`.
    pub fn fit_bounds(&mut self, bounds: Bounds, viewport: Viewport, max_zoom: u8) {
        self.center = bounds.center();
        self.zoom = zoom_for_bounds(&bounds, viewport).min(max_zoom);
        self.bounds = Some(bounds);
    }

    /// Area actually visible at the current center and zoom
    pub fn visible_bounds(&self, viewport: Viewport) -> Bounds {
        let world_px = TILE_SIZE * 2f64.powi(i32::from(self.zoom));
        let half_lng = 180.0 * f64::from(viewport.width) / world_px;
        let half_y = PI * f64::from(viewport.height) / world_px;
        let center_y = mercator_y(self.center.lat);

        Bounds {
            south: inverse_mercator_y(center_y - half_y),
            west: self.center.lng - half_lng,
            north: inverse_mercator_y(center_y + half_y),
            east: self.center.lng + half_lng,
        }
    }
}
