//! Heatmap overlay weighted by a numeric layer attribute.

use crate::layers::base::LayerMetadata;
use crate::layers::manager::LayerManager;
use crate::rendering::renderer::{MapRenderer, StyleLayer};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const NUMERIC_TYPES: [&str; 11] = [
    "int2",
    "int4",
    "int8",
    "integer",
    "bigint",
    "smallint",
    "float4",
    "float8",
    "real",
    "double precision",
    "numeric",
];

/// Whether a column of database type `data_type` can weight a heatmap.
pub fn is_numeric_type(data_type: &str) -> bool {
    let data_type = data_type.trim();
    NUMERIC_TYPES
        .iter()
        .any(|numeric| numeric.eq_ignore_ascii_case(data_type))
}

/// Names of the numeric attribute columns of a layer, in metadata order.
pub fn numeric_properties(metadata: &LayerMetadata) -> Vec<&str> {
    metadata
        .properties
        .iter()
        .filter(|p| is_numeric_type(&p.data_type))
        .map(|p| p.name.as_str())
        .collect()
}

/// Colour ramps available for heatmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorScheme {
    #[default]
    YlOrRd,
    BuRd,
    GnRd,
    WhBu,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 4] = [Self::YlOrRd, Self::BuRd, Self::GnRd, Self::WhBu];

    pub fn name(&self) -> &'static str {
        match self {
            Self::YlOrRd => "YlOrRd",
            Self::BuRd => "BuRd",
            Self::GnRd => "GnRd",
            Self::WhBu => "WhBu",
        }
    }

    /// `(density, colour)` stops from sparse to dense. The first stop is
    /// fully transparent.
    pub fn gradient(&self) -> [(f64, &'static str); 6] {
        match self {
            Self::YlOrRd => [
                (0.0, "rgba(255,255,178,0)"),
                (0.2, "rgb(254,204,92)"),
                (0.4, "rgb(253,141,60)"),
                (0.6, "rgb(240,59,32)"),
                (0.8, "rgb(189,0,38)"),
                (1.0, "rgb(128,0,38)"),
            ],
            Self::BuRd => [
                (0.0, "rgba(33,102,172,0)"),
                (0.2, "rgb(103,169,207)"),
                (0.4, "rgb(209,229,240)"),
                (0.6, "rgb(253,219,199)"),
                (0.8, "rgb(239,138,98)"),
                (1.0, "rgb(178,24,43)"),
            ],
            Self::GnRd => [
                (0.0, "rgba(26,152,80,0)"),
                (0.2, "rgb(145,207,96)"),
                (0.4, "rgb(217,239,139)"),
                (0.6, "rgb(254,224,139)"),
                (0.8, "rgb(252,141,89)"),
                (1.0, "rgb(215,48,39)"),
            ],
            Self::WhBu => [
                (0.0, "rgba(255,255,255,0)"),
                (0.2, "rgb(222,235,247)"),
                (0.4, "rgb(158,202,225)"),
                (0.6, "rgb(107,174,214)"),
                (0.8, "rgb(49,130,189)"),
                (1.0, "rgb(8,81,156)"),
            ],
        }
    }

    /// `heatmap-color` expression for this ramp.
    fn color_expression(&self) -> Value {
        let mut expression = vec![json!("interpolate"), json!(["linear"]), json!(["heatmap-density"])];
        for (stop, colour) in self.gradient() {
            expression.push(json!(stop));
            expression.push(json!(colour));
        }
        Value::Array(expression)
    }
}

/// Heatmap over one active layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapSpec {
    pub layer_id: String,
    /// Numeric attribute weighting each feature
    pub property: String,
    #[serde(default)]
    pub scheme: ColorScheme,
    /// Attribute value mapped to zero weight
    pub min: f64,
    /// Attribute value mapped to full weight
    pub max: f64,
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_radius() -> f64 {
    20.0
}

fn default_opacity() -> f64 {
    0.8
}

impl HeatmapSpec {
    pub fn new(layer_id: impl Into<String>, property: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            layer_id: layer_id.into(),
            property: property.into(),
            scheme: ColorScheme::default(),
            min,
            max,
            radius: default_radius(),
            opacity: default_opacity(),
        }
    }

    pub fn with_scheme(mut self, scheme: ColorScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn overlay_id(&self) -> String {
        format!("{}-heatmap", self.layer_id)
    }

    /// Style layer drawing the heatmap. The source is filled in when the
    /// overlay is attached to its layer.
    pub fn style_layer(&self, metadata: &LayerMetadata) -> Result<StyleLayer> {
        let property = metadata.property(&self.property).ok_or_else(|| {
            MapError::Layer(format!(
                "layer {} has no attribute {}",
                self.layer_id, self.property
            ))
        })?;
        if !is_numeric_type(&property.data_type) {
            return Err(MapError::Layer(format!(
                "attribute {} of type {} cannot weight a heatmap",
                property.name, property.data_type
            )));
        }
        if !(self.min.is_finite() && self.max.is_finite() && self.min < self.max) {
            return Err(MapError::Config(format!(
                "heatmap range [{}, {}] is empty",
                self.min, self.max
            )));
        }

        Ok(StyleLayer {
            id: self.overlay_id(),
            kind: "heatmap".to_string(),
            source: String::new(),
            source_layer: Some(self.layer_id.clone()),
            paint: json!({
                "heatmap-weight": [
                    "interpolate", ["linear"], ["to-number", ["get", self.property]],
                    self.min, 0,
                    self.max, 1
                ],
                "heatmap-color": self.scheme.color_expression(),
                "heatmap-radius": self.radius,
                "heatmap-opacity": self.opacity,
            }),
        })
    }

    /// Attaches the heatmap to its active layer. Returns the overlay id.
    pub fn apply<R: MapRenderer>(&self, manager: &LayerManager<R>) -> Result<String> {
        let metadata = manager
            .metadata(&self.layer_id)
            .ok_or_else(|| MapError::Layer(format!("layer {} is not active", self.layer_id)))?;
        let style_layer = self.style_layer(&metadata)?;
        let overlay_id = style_layer.id.clone();
        manager.add_overlay(&self.layer_id, style_layer)?;
        log::info!(
            "heatmap on {}.{} using {}",
            self.layer_id,
            self.property,
            self.scheme.name()
        );
        Ok(overlay_id)
    }
}
