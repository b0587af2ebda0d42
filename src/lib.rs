//! # Terrastack
//!
//! Map-layer lifecycle and spatial query composition for the Terrastack
//! land-parcel viewer.
//!
//! The crate owns the set of vector-tile layers active on a map, keeps a
//! renderer's sources and style layers in lockstep with that set, composes
//! CQL filter strings from attribute conditions and builds WMS
//! GetFeatureInfo queries for point-and-click feature lookups.

pub mod core;
pub mod data;
pub mod layers;
pub mod plugins;
pub mod prelude;
pub mod rendering;
pub mod tiles;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{ServiceConfig, TileUrlStrategy},
    geo::{LatLng, Point},
    viewport::{Viewport, ViewportExtent},
};

pub use data::{
    filter::{compose_cql, FilterCondition, FilterDefinition, FilterOperator, FilterValue, JoinOperator, LayerFilters},
    service::{HttpLayerService, LayerService},
    wms::FeatureInfoRequest,
};

pub use layers::{
    base::{GeometryKind, Layer, LayerMetadata, PropertyInfo},
    manager::{Activation, LayerManager},
    set::ActiveLayerSet,
};

pub use rendering::{renderer::MapRenderer, style_document::StyleDocument};

pub use tiles::source::{AuthorizedTileSource, DirectTileSource, TileUrlResolver};

pub use ui::popup::{FeatureInfo, PopupAnchor, PopupPlacement};

pub use plugins::{heatmap::HeatmapSpec, measure::Measurement};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Timed out after {after:?} waiting for {what}")]
    Timeout {
        what: String,
        after: std::time::Duration,
    },

    #[error("Geometry type is missing from metadata of layer {0}")]
    MissingGeometry(String),

    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometry(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger` as the `log` backend, honouring `RUST_LOG`.
///
/// Calling it more than once is harmless.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
