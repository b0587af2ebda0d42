use crate::core::geo::Point;
use crate::Result;
use serde_json::Value;

/// A tiled vector data source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpec {
    pub id: String,
    /// `{z}/{x}/{y}` URL templates
    pub tiles: Vec<String>,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

/// A style layer drawing one source
#[derive(Debug, Clone, PartialEq)]
pub struct StyleLayer {
    pub id: String,
    /// Style primitive, e.g. `circle`, `line`, `fill` or `heatmap`
    pub kind: String,
    pub source: String,
    pub source_layer: Option<String>,
    pub paint: Value,
}

/// Map renderer operations the layer manager drives.
///
/// Implementations wrap a concrete rendering library. All calls happen on
/// the caller's thread while the manager holds its state lock, so
/// implementations must not block.
pub trait MapRenderer: Send {
    fn add_source(&mut self, source: SourceSpec) -> Result<()>;

    fn remove_source(&mut self, source_id: &str) -> Result<()>;

    fn add_layer(&mut self, layer: StyleLayer) -> Result<()>;

    fn remove_layer(&mut self, layer_id: &str) -> Result<()>;

    fn has_source(&self, source_id: &str) -> bool;

    fn has_layer(&self, layer_id: &str) -> bool;

    /// Size of the drawing surface in screen units
    fn canvas_size(&self) -> Point;
}
