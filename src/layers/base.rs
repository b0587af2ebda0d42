use serde::{Deserialize, Serialize};
use std::fmt;

use crate::layers::style::StyleKind;

/// Spatial type of a layer's features, as reported by layer metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    MultiCurve,
    Polygon,
    MultiPolygon,
    Geometry,
    Other(String),
}

impl GeometryKind {
    pub fn parse(value: &str) -> Self {
        match value {
            "Point" => GeometryKind::Point,
            "MultiPoint" => GeometryKind::MultiPoint,
            "LineString" => GeometryKind::LineString,
            "MultiLineString" => GeometryKind::MultiLineString,
            "MultiCurve" => GeometryKind::MultiCurve,
            "Polygon" => GeometryKind::Polygon,
            "MultiPolygon" => GeometryKind::MultiPolygon,
            "Geometry" => GeometryKind::Geometry,
            other => GeometryKind::Other(other.to_string()),
        }
    }

    /// The style primitive used to draw this kind, or `None` when the kind
    /// is not supported.
    pub fn style_kind(&self) -> Option<StyleKind> {
        match self {
            GeometryKind::Point | GeometryKind::MultiPoint => Some(StyleKind::Circle),
            GeometryKind::LineString | GeometryKind::MultiLineString | GeometryKind::MultiCurve => {
                Some(StyleKind::Line)
            }
            GeometryKind::Polygon | GeometryKind::MultiPolygon | GeometryKind::Geometry => {
                Some(StyleKind::Fill)
            }
            GeometryKind::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::MultiCurve => "MultiCurve",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::Geometry => "Geometry",
            GeometryKind::Other(other) => other,
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A layer from the remote catalog. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Layer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Name shown to users, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Style layer id registered with the renderer.
    pub fn style_layer_id(&self) -> String {
        style_layer_id(&self.id)
    }

    /// Data source id registered with the renderer.
    pub fn source_id(&self) -> String {
        source_id(&self.id)
    }
}

pub(crate) fn style_layer_id(layer_id: &str) -> String {
    format!("{layer_id}-layer")
}

pub(crate) fn source_id(layer_id: &str) -> String {
    format!("{layer_id}-source")
}

/// One attribute column of a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Metadata document served per layer id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerMetadata {
    #[serde(rename = "geometrytype", default)]
    pub geometry_type: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyInfo>,
}

impl LayerMetadata {
    pub fn new(geometry_type: impl Into<String>, properties: Vec<PropertyInfo>) -> Self {
        Self {
            geometry_type: Some(geometry_type.into()),
            properties,
        }
    }

    /// Geometry kind, `None` when the document does not state one.
    pub fn geometry_kind(&self) -> Option<GeometryKind> {
        self.geometry_type
            .as_deref()
            .filter(|kind| !kind.is_empty())
            .map(GeometryKind::parse)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_kind_to_style() {
        assert_eq!(GeometryKind::parse("Point").style_kind(), Some(StyleKind::Circle));
        assert_eq!(GeometryKind::parse("MultiPoint").style_kind(), Some(StyleKind::Circle));
        assert_eq!(GeometryKind::parse("MultiCurve").style_kind(), Some(StyleKind::Line));
        assert_eq!(GeometryKind::parse("LineString").style_kind(), Some(StyleKind::Line));
        assert_eq!(GeometryKind::parse("Geometry").style_kind(), Some(StyleKind::Fill));
        assert_eq!(GeometryKind::parse("MultiPolygon").style_kind(), Some(StyleKind::Fill));
        assert_eq!(GeometryKind::parse("GeometryCollection").style_kind(), None);
        assert_eq!(GeometryKind::parse("point").style_kind(), None);
    }

    #[test]
    fn test_geometry_kind_display() {
        assert_eq!(GeometryKind::MultiLineString.to_string(), "MultiLineString");
        assert_eq!(GeometryKind::parse("Tin").to_string(), "Tin");
    }

    #[test]
    fn test_layer_ids() {
        let layer = Layer::new("public.plots", "");
        assert_eq!(layer.display_name(), "public.plots");
        assert_eq!(layer.style_layer_id(), "public.plots-layer");
        assert_eq!(layer.source_id(), "public.plots-source");
    }

    #[test]
    fn test_metadata_parsing() {
        let metadata: LayerMetadata = serde_json::from_str(
            r#"{"id": "public.plots", "geometrytype": "MultiPolygon",
                "properties": [{"name": "khata_no", "type": "int4"}, {"name": "owner", "type": "text"}]}"#,
        )
        .unwrap();

        assert_eq!(metadata.geometry_kind(), Some(GeometryKind::MultiPolygon));
        assert_eq!(metadata.properties.len(), 2);
        assert_eq!(metadata.property("owner").map(|p| p.data_type.as_str()), Some("text"));
    }

    #[test]
    fn test_metadata_without_geometry() {
        let metadata: LayerMetadata = serde_json::from_str(r#"{"properties": []}"#).unwrap();
        assert_eq!(metadata.geometry_kind(), None);

        let metadata: LayerMetadata = serde_json::from_str(r#"{"geometrytype": ""}"#).unwrap();
        assert_eq!(metadata.geometry_kind(), None);
    }
}
