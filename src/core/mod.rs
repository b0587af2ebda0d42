pub mod config;
pub mod constants;
pub mod geo;
pub mod viewport;

// Re-exports for convenience
pub use config::{ServiceConfig, TileUrlStrategy};
pub use geo::{LatLng, Point};
pub use viewport::{Viewport, ViewportExtent};
