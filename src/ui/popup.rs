use crate::core::constants::{MISSING_ATTRIBUTE, POPUP_SIZE};
use crate::core::geo::Point;
use crate::data::feature::RenderedFeature;
use crate::layers::base::LayerMetadata;

/// Which side of the clicked point the popup opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupPlacement {
    Above,
    Below,
}

/// Screen position of an info popup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupAnchor {
    /// Top-left corner of the popup
    pub origin: Point,
    pub placement: PopupPlacement,
}

impl PopupAnchor {
    /// Places a `size` popup for a click at `point` so that it stays inside a
    /// viewport of `viewport` size.
    ///
    /// The popup opens above the point, horizontally centered on it. It flips
    /// below when it would cross the top edge and shifts sideways when it
    /// would cross the left or right edge.
    pub fn place(point: Point, size: Point, viewport: Point) -> Self {
        let (placement, top) = if point.y - size.y < 0.0 {
            (PopupPlacement::Below, point.y)
        } else {
            (PopupPlacement::Above, point.y - size.y)
        };

        let mut left = point.x - size.x / 2.0;
        if left + size.x > viewport.x {
            left = viewport.x - size.x;
        }
        if left < 0.0 {
            left = 0.0;
        }

        Self {
            origin: Point::new(left, top),
            placement,
        }
    }

    /// Placement for the fixed-size feature popup.
    pub fn for_feature_popup(point: Point, viewport: Point) -> Self {
        Self::place(point, Point::new(POPUP_SIZE.0, POPUP_SIZE.1), viewport)
    }
}

/// Attributes of a clicked feature, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfo {
    pub layer_id: String,
    pub layer_name: String,
    /// `(attribute, display value)` pairs in display order
    pub attributes: Vec<(String, String)>,
    pub anchor: PopupAnchor,
}

impl FeatureInfo {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Lists the feature's attributes in metadata order, `N/A` for anything the
/// feature lacks. Without metadata columns, every feature property is listed
/// by name.
pub(crate) fn display_attributes(
    metadata: &LayerMetadata,
    feature: &RenderedFeature,
) -> Vec<(String, String)> {
    if metadata.properties.is_empty() {
        let mut names: Vec<&String> = feature.properties.keys().collect();
        names.sort();
        return names
            .into_iter()
            .map(|name| {
                let value = feature
                    .display_value(name)
                    .unwrap_or_else(|| MISSING_ATTRIBUTE.to_string());
                (name.clone(), value)
            })
            .collect();
    }

    metadata
        .properties
        .iter()
        .map(|property| {
            let value = feature
                .display_value(&property.name)
                .unwrap_or_else(|| MISSING_ATTRIBUTE.to_string());
            (property.name.clone(), value)
        })
        .collect()
}
