// Document layout: block segmentation, page geometry, and the markup engine that turns a
// markdown fragment into a measured visual tree.

pub mod font_metrics;
pub mod geometry;
pub mod markup;
pub mod segment;

// Re-export the public API consumed by pagination and rendering.
pub use geometry::{PageGeometry, PageSizePreset};
pub use markup::{MarkupEngine, MarkupOptions, VisualTree};
pub use segment::normalize_line_endings;
