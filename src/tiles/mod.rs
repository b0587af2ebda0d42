pub mod source;

// Re-exports for convenience
pub use source::{resolver_for, AuthorizedTileSource, DirectTileSource, TileUrlResolver};
