pub mod base;
pub mod manager;
pub mod set;
pub mod style;

pub use base::{GeometryKind, Layer, LayerMetadata, PropertyInfo};
pub use manager::{Activation, LayerManager};
pub use set::{ActiveLayer, ActiveLayerSet};
pub use style::{LayerStyle, StyleKind};
