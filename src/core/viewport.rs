use crate::core::constants::{TILE_SIZE, WORLD_LAT_SPAN, WORLD_LON_SPAN};
use crate::core::geo::{LatLng, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rectangular geographic extent `(min_lon, min_lat, max_lon, max_lat)`.
///
/// Derived on demand from a center, zoom and pixel size; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportExtent {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl ViewportExtent {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Approximates the extent visible around `(center_lon, center_lat)`.
    ///
    /// Planar approximation that ignores Mercator distortion. It only bounds
    /// a small feature-identify query and must not be used for rendering.
    /// Non-finite inputs propagate into the result.
    pub fn around(center_lon: f64, center_lat: f64, zoom: f64, width: f64, height: f64) -> Self {
        let zoom_factor = 2f64.powf(zoom);
        let lon_extent = WORLD_LON_SPAN / zoom_factor * (width / TILE_SIZE);
        let lat_extent = WORLD_LAT_SPAN / zoom_factor * (height / TILE_SIZE);

        Self {
            min_lon: center_lon - lon_extent / 2.0,
            min_lat: center_lat - lat_extent / 2.0,
            max_lon: center_lon + lon_extent / 2.0,
            max_lat: center_lat + lat_extent / 2.0,
        }
    }

    /// Builds an extent from a `[min_lon, min_lat, max_lon, max_lat]` slice.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [min_lon, min_lat, max_lon, max_lat] => {
                Some(Self::new(*min_lon, *min_lat, *max_lon, *max_lat))
            }
            _ => None,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Formats as the `minLon,minLat,maxLon,maxLat` BBOX query value.
    pub fn to_bbox_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ViewportExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// The current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
}

impl Viewport {
    /// Creates a new viewport. Negative zooms are raised to 0.
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.max(0.0),
            size,
        }
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.center = center;
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.max(0.0);
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Pixel coordinates of the viewport center, rounded like the WMS X/Y
    /// query parameters.
    pub fn pixel_center(&self) -> (i64, i64) {
        (
            (self.size.x / 2.0).round() as i64,
            (self.size.y / 2.0).round() as i64,
        )
    }

    /// Approximate extent around the viewport center.
    pub fn extent(&self) -> ViewportExtent {
        ViewportExtent::around(
            self.center.lng,
            self.center.lat,
            self.zoom,
            self.size.x,
            self.size.y,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        // Jalgaon district, the viewer's initial view
        Self::new(LatLng::new(21.0486, 75.7139), 12.0, Point::new(1024.0, 768.0))
    }
}
