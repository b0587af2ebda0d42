//! Prelude module for common terrastack types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use terrastack::prelude::*;`

pub use crate::core::{
    config::{ServiceConfig, TileUrlStrategy},
    geo::{LatLng, Point},
    viewport::{Viewport, ViewportExtent},
};

pub use crate::layers::{
    base::{GeometryKind, Layer, LayerMetadata, PropertyInfo},
    manager::{Activation, LayerManager},
    set::{ActiveLayer, ActiveLayerSet},
    style::{LayerStyle, StyleKind},
};

pub use crate::data::{
    feature::{Feature, RenderedFeature},
    filter::{
        compose_cql, FilterCondition, FilterDefinition, FilterOperator, FilterValue,
        JoinOperator, LayerFilters,
    },
    service::{HttpLayerService, LayerService},
    wms::FeatureInfoRequest,
};

pub use crate::rendering::{
    renderer::{MapRenderer, SourceSpec, StyleLayer},
    style_document::StyleDocument,
};

pub use crate::tiles::source::{AuthorizedTileSource, DirectTileSource, TileUrlResolver};

pub use crate::ui::popup::{FeatureInfo, PopupAnchor, PopupPlacement};

pub use crate::plugins::{
    heatmap::{ColorScheme, HeatmapSpec},
    measure::{Measurement, MeasureTool},
};

pub use crate::{Error as MapError, Result};

pub use std::{sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
