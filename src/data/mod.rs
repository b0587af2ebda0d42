pub mod cache;
pub mod feature;
pub mod filter;
pub mod service;
pub mod wms;

// Re-exports for convenience
pub use cache::MetadataCache;
pub use feature::{Feature, RenderedFeature};
pub use filter::{compose_cql, FilterCondition, FilterDefinition, FilterOperator, FilterValue, JoinOperator, LayerFilters};
pub use service::{HttpLayerService, LayerService};
pub use wms::FeatureInfoRequest;
