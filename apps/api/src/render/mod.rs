// Page rendering: visual surfaces for pages and their raster images.

pub mod page;
pub mod raster;

pub use page::{render_snapshot, PageStack, PAGE_SURFACE_MARKER};
pub use raster::{RasterError, Rasterizer};
