pub mod renderer;
pub mod style_document;

// Re-exports for convenience
pub use renderer::{MapRenderer, SourceSpec, StyleLayer};
pub use style_document::StyleDocument;
