//! Page Renderer: turns pagination results into visual page surfaces.
//!
//! A paged surface has the fixed outer size of the page and renders its content at the
//! printable width, offset by the margin. Content running past the page edge is clipped:
//! boxes starting below it are dropped and the surface is flagged. The single-flow surface
//! grows to fit the whole document.

use serde::Serialize;

use crate::layout::{MarkupEngine, PageGeometry, VisualTree};
use crate::pagination::session::{PreviewSnapshot, SnapshotStatus};

/// Marker carried by every rendered page; the exporter collects surfaces by it.
pub const PAGE_SURFACE_MARKER: &str = "page-surface";

#[derive(Debug, Clone, Serialize)]
pub struct PageSurface {
    pub index: usize,
    pub marker: &'static str,
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Content boxes, positioned relative to the top-left of the printable area.
    pub tree: VisualTree,
    pub clipped: bool,
}

/// The rendered surfaces of one preview, in display order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageStack {
    surfaces: Vec<PageSurface>,
}

impl PageStack {
    pub fn new(surfaces: Vec<PageSurface>) -> Self {
        PageStack { surfaces }
    }

    /// Surfaces carrying `marker`, in order.
    pub fn select<'a>(&'a self, marker: &'a str) -> impl Iterator<Item = &'a PageSurface> + 'a {
        self.surfaces.iter().filter(move |s| s.marker == marker)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }
}

/// Renders one page at the page's fixed size.
pub fn render_page(
    engine: &MarkupEngine,
    geometry: &PageGeometry,
    index: usize,
    text: &str,
) -> PageSurface {
    let mut tree = engine.render(text, geometry.printable_width());
    // Page edge in content coordinates.
    let edge = geometry.height - geometry.margin;
    let clipped = tree.height > edge;
    if clipped {
        tree.lines.retain(|line| line.y < edge);
        tree.decorations.retain(|d| d.y < edge);
    }
    PageSurface {
        index,
        marker: PAGE_SURFACE_MARKER,
        width: geometry.width,
        height: geometry.height,
        margin: geometry.margin,
        tree,
        clipped,
    }
}

/// Renders the whole document as one surface tall enough to hold it.
pub fn render_flow(engine: &MarkupEngine, geometry: &PageGeometry, document: &str) -> PageSurface {
    let tree = engine.render(document, geometry.printable_width());
    PageSurface {
        index: 0,
        marker: PAGE_SURFACE_MARKER,
        width: geometry.width,
        height: tree.height + 2.0 * geometry.margin,
        margin: geometry.margin,
        tree,
        clipped: false,
    }
}

pub fn render_snapshot(engine: &MarkupEngine, snapshot: &PreviewSnapshot) -> PageStack {
    let surfaces = match snapshot.status {
        SnapshotStatus::SingleFlow => {
            vec![render_flow(engine, &snapshot.geometry, &snapshot.document)]
        }
        SnapshotStatus::Provisional | SnapshotStatus::Paginated => snapshot
            .pages
            .iter()
            .enumerate()
            .map(|(index, page)| render_page(engine, &snapshot.geometry, index, &page.text))
            .collect(),
    };
    PageStack::new(surfaces)
}
