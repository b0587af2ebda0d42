//! Renderer that maintains a MapLibre style document.
//!
//! The document can be handed to any MapLibre-compatible client, which then
//! draws the registered sources and layers.

use crate::core::geo::Point;
use crate::rendering::renderer::{MapRenderer, SourceSpec, StyleLayer};
use crate::{MapError, Result};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone)]
pub struct StyleDocument {
    sources: Map<String, Value>,
    layers: Vec<Value>,
    canvas_size: Point,
}

impl StyleDocument {
    pub fn new(canvas_size: Point) -> Self {
        Self {
            sources: Map::new(),
            layers: Vec::new(),
            canvas_size,
        }
    }

    /// Adds a raster base map drawn beneath every other layer.
    pub fn with_basemap(mut self, id: &str, tiles: &str) -> Self {
        self.sources.insert(
            id.to_string(),
            json!({ "type": "raster", "tiles": [tiles], "tileSize": 256 }),
        );
        self.layers
            .insert(0, json!({ "id": id, "type": "raster", "source": id }));
        self
    }

    pub fn set_canvas_size(&mut self, size: Point) {
        self.canvas_size = size;
    }

    pub fn source(&self, source_id: &str) -> Option<&Value> {
        self.sources.get(source_id)
    }

    pub fn layer(&self, layer_id: &str) -> Option<&Value> {
        self.layers.iter().find(|l| l["id"] == layer_id)
    }

    /// Style layer ids in drawing order
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().filter_map(|l| l["id"].as_str()).collect()
    }

    pub fn to_json(&self) -> Value {
        json!({
            "version": 8,
            "sources": self.sources,
            "layers": self.layers,
        })
    }

    pub fn to_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json())?)
    }
}

impl Default for StyleDocument {
    fn default() -> Self {
        Self::new(Point::new(1024.0, 768.0))
    }
}

impl MapRenderer for StyleDocument {
    fn add_source(&mut self, source: SourceSpec) -> Result<()> {
        if self.sources.contains_key(&source.id) {
            return Err(MapError::Render(format!(
                "source {} already exists",
                source.id
            )));
        }
        self.sources.insert(
            source.id,
            json!({
                "type": "vector",
                "tiles": source.tiles,
                "minzoom": source.min_zoom,
                "maxzoom": source.max_zoom,
            }),
        );
        Ok(())
    }

    fn remove_source(&mut self, source_id: &str) -> Result<()> {
        if self.layers.iter().any(|l| l["source"] == source_id) {
            return Err(MapError::Render(format!(
                "source {source_id} is still used by a layer"
            )));
        }
        self.sources
            .remove(source_id)
            .map(|_| ())
            .ok_or_else(|| MapError::Render(format!("source {source_id} does not exist")))
    }

    fn add_layer(&mut self, layer: StyleLayer) -> Result<()> {
        if self.has_layer(&layer.id) {
            return Err(MapError::Render(format!("layer {} already exists", layer.id)));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(MapError::Render(format!(
                "layer {} references missing source {}",
                layer.id, layer.source
            )));
        }

        let mut value = json!({
            "id": layer.id,
            "type": layer.kind,
            "source": layer.source,
            "paint": layer.paint,
        });
        if let Some(source_layer) = layer.source_layer {
            value["source-layer"] = Value::String(source_layer);
        }
        self.layers.push(value);
        Ok(())
    }

    fn remove_layer(&mut self, layer_id: &str) -> Result<()> {
        let before = self.layers.len();
        self.layers.retain(|l| l["id"] != layer_id);
        if self.layers.len() == before {
            return Err(MapError::Render(format!("layer {layer_id} does not exist")));
        }
        Ok(())
    }

    fn has_source(&self, source_id: &str) -> bool {
        self.sources.contains_key(source_id)
    }

    fn has_layer(&self, layer_id: &str) -> bool {
        self.layers.iter().any(|l| l["id"] == layer_id)
    }

    fn canvas_size(&self) -> Point {
        self.canvas_size
    }
}
