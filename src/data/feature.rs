use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A GeoJSON feature returned by the feature-query service.
///
/// Geometry is kept as raw JSON; this crate only reads attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// Root of a GetFeatureInfo JSON response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// A feature as reported by the renderer under a click.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderedFeature {
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl RenderedFeature {
    pub fn new(properties: Map<String, Value>) -> Self {
        Self { properties }
    }

    /// Display text of an attribute. Missing, null and empty values yield
    /// `None`; strings are shown without quotes.
    pub fn display_value(&self, name: &str) -> Option<String> {
        match self.properties.get(name)? {
            Value::Null => None,
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl From<Feature> for RenderedFeature {
    fn from(feature: Feature) -> Self {
        Self::new(feature.properties)
    }
}
