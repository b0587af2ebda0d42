use crate::layers::base::{GeometryKind, Layer, LayerMetadata};
use crate::layers::style::LayerStyle;

/// A layer currently rendered on the map, with everything resolved while
/// activating it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveLayer {
    pub layer: Layer,
    pub geometry: GeometryKind,
    pub style: LayerStyle,
    pub metadata: LayerMetadata,
    /// `{z}/{x}/{y}` template the data source was registered with
    pub tile_url: String,
    /// Auxiliary style layers bound to this layer's source
    pub overlays: Vec<String>,
}

impl ActiveLayer {
    pub fn id(&self) -> &str {
        &self.layer.id
    }
}

/// Layers rendered on the map in activation order. Ids are unique.
#[derive(Debug, Clone, Default)]
pub struct ActiveLayerSet {
    layers: Vec<ActiveLayer>,
}

impl ActiveLayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `layer` unless its id is already present. Returns whether it
    /// was inserted.
    pub fn insert(&mut self, layer: ActiveLayer) -> bool {
        if self.contains(layer.id()) {
            return false;
        }
        self.layers.push(layer);
        true
    }

    pub fn remove(&mut self, layer_id: &str) -> Option<ActiveLayer> {
        let index = self.layers.iter().position(|l| l.id() == layer_id)?;
        Some(self.layers.remove(index))
    }

    pub fn contains(&self, layer_id: &str) -> bool {
        self.layers.iter().any(|l| l.id() == layer_id)
    }

    pub fn get(&self, layer_id: &str) -> Option<&ActiveLayer> {
        self.layers.iter().find(|l| l.id() == layer_id)
    }

    pub fn get_mut(&mut self, layer_id: &str) -> Option<&mut ActiveLayer> {
        self.layers.iter_mut().find(|l| l.id() == layer_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveLayer> {
        self.layers.iter()
    }

    /// Ids in activation order
    pub fn ids(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.layer.id.clone()).collect()
    }

    /// Removes and returns every layer, most recently activated first.
    pub fn drain(&mut self) -> Vec<ActiveLayer> {
        let mut drained: Vec<ActiveLayer> = self.layers.drain(..).collect();
        drained.reverse();
        drained
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
