pub mod heatmap;
pub mod measure;

pub use heatmap::{ColorScheme, HeatmapSpec};
pub use measure::{MeasureTool, Measurement};
