use crate::core::constants::{
    CIRCLE_COLOR, CIRCLE_RADIUS, FILL_COLOR, FILL_OPACITY, FILL_OUTLINE_COLOR, LINE_COLOR,
    LINE_WIDTH,
};
use serde_json::{json, Value};
use std::fmt;

/// Renderer style primitive for a vector layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Circle,
    Line,
    Fill,
}

impl StyleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleKind::Circle => "circle",
            StyleKind::Line => "line",
            StyleKind::Fill => "fill",
        }
    }

    /// Default paint properties for the primitive.
    pub fn default_paint(&self) -> Value {
        match self {
            StyleKind::Circle => json!({
                "circle-radius": CIRCLE_RADIUS,
                "circle-color": CIRCLE_COLOR,
            }),
            StyleKind::Line => json!({
                "line-width": LINE_WIDTH,
                "line-color": LINE_COLOR,
            }),
            StyleKind::Fill => json!({
                "fill-color": FILL_COLOR,
                "fill-opacity": FILL_OPACITY,
                "fill-outline-color": FILL_OUTLINE_COLOR,
            }),
        }
    }
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive plus paint resolved for an active layer
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    pub kind: StyleKind,
    pub paint: Value,
}

impl LayerStyle {
    pub fn new(kind: StyleKind) -> Self {
        Self {
            kind,
            paint: kind.default_paint(),
        }
    }
}
