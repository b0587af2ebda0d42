pub mod popup;

pub use popup::{FeatureInfo, PopupAnchor, PopupPlacement};
