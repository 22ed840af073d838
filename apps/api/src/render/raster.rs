//! Rasterizer: paints a page surface into a PNG image with tiny-skia.
//!
//! Coordinates on a surface are CSS pixels; the pixmap is `scale` times larger. Text is
//! drawn from glyph outlines when a TrueType font is configured, otherwise each line is
//! greeked as a bar of its measured width.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};
use tracing::debug;
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use crate::config::Config;
use crate::layout::markup::{Decoration, DecorationKind, LineBox};
use crate::render::page::PageSurface;

/// Default resolution multiplier.
pub const DEFAULT_SCALE: f32 = 2.0;
pub const DEFAULT_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Largest pixmap side, in device pixels. Taller single-flow surfaces are refused.
pub const MAX_RASTER_SIDE: f32 = 32_767.0;

/// Share of the font size above the baseline.
const ASCENT: f32 = 0.8;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("invalid raster size {width}x{height} at scale {scale}")]
    InvalidSize { width: f32, height: f32, scale: f32 },

    #[error("png encode failed: {0}")]
    Encode(String),

    #[error("font {path}: {reason}")]
    Font { path: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct Rasterizer {
    scale: f32,
    background: [u8; 3],
    font: Option<Arc<Vec<u8>>>,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Rasterizer::new(DEFAULT_SCALE)
    }
}

impl Rasterizer {
    pub fn new(scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            DEFAULT_SCALE
        };
        Rasterizer {
            scale,
            background: DEFAULT_BACKGROUND,
            font: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, RasterError> {
        let rasterizer = Rasterizer::new(config.export_scale);
        match &config.font_path {
            Some(path) => rasterizer.with_font_file(path),
            None => Ok(rasterizer),
        }
    }

    /// Loads a TrueType/OpenType font for glyph drawing.
    pub fn with_font_file(mut self, path: &Path) -> Result<Self, RasterError> {
        let font_error = |reason: String| RasterError::Font {
            path: path.display().to_string(),
            reason,
        };
        let bytes = std::fs::read(path).map_err(|e| font_error(e.to_string()))?;
        Face::parse(&bytes, 0).map_err(|e| font_error(e.to_string()))?;
        self.font = Some(Arc::new(bytes));
        Ok(self)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Paints `surface` and encodes the result as PNG.
    pub fn rasterize(&self, surface: &PageSurface) -> Result<Vec<u8>, RasterError> {
        let invalid = || RasterError::InvalidSize {
            width: surface.width,
            height: surface.height,
            scale: self.scale,
        };
        let width_px = (surface.width * self.scale).ceil();
        let height_px = (surface.height * self.scale).ceil();
        let fits = |side: f32| (1.0..=MAX_RASTER_SIDE).contains(&side);
        if !(fits(width_px) && fits(height_px)) {
            return Err(invalid());
        }
        let mut pixmap = Pixmap::new(width_px as u32, height_px as u32).ok_or_else(invalid)?;

        let [r, g, b] = self.background;
        pixmap.fill(Color::from_rgba8(r, g, b, 255));

        let offset = surface.margin * self.scale;
        let transform = Transform::from_row(self.scale, 0.0, 0.0, self.scale, offset, offset);

        for decoration in &surface.tree.decorations {
            draw_decoration(&mut pixmap, decoration, transform);
        }

        let face = self
            .font
            .as_deref()
            .and_then(|bytes| Face::parse(bytes, 0).ok());
        for line in &surface.tree.lines {
            match &face {
                Some(face) => draw_line(&mut pixmap, face, line, transform),
                None => greek_line(&mut pixmap, line, transform),
            }
        }

        let png = pixmap
            .encode_png()
            .map_err(|e| RasterError::Encode(e.to_string()))?;
        debug!(
            page = surface.index,
            width = width_px,
            height = height_px,
            bytes = png.len(),
            "page rasterized"
        );
        Ok(png)
    }
}

fn paint(color: [u8; 3]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], 255);
    paint.anti_alias = true;
    paint
}

fn draw_decoration(pixmap: &mut Pixmap, decoration: &Decoration, transform: Transform) {
    let Some(rect) = Rect::from_xywh(
        decoration.x,
        decoration.y,
        decoration.width.max(0.5),
        decoration.height.max(0.5),
    ) else {
        return;
    };
    match decoration.kind {
        DecorationKind::TableBorder => {
            let path = PathBuilder::from_rect(rect);
            let stroke = Stroke {
                width: 1.0,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint([209, 213, 219]), &stroke, transform, None);
        }
        DecorationKind::Rule => pixmap.fill_rect(rect, &paint([229, 231, 235]), transform, None),
        DecorationKind::CodeBackground => {
            pixmap.fill_rect(rect, &paint([243, 244, 246]), transform, None)
        }
        DecorationKind::QuoteBar => pixmap.fill_rect(rect, &paint([209, 213, 219]), transform, None),
        DecorationKind::ImagePlaceholder => {
            pixmap.fill_rect(rect, &paint([229, 231, 235]), transform, None)
        }
    }
}

/// Draws a line as a solid bar over the middle of its line box.
fn greek_line(pixmap: &mut Pixmap, line: &LineBox, transform: Transform) {
    let bar = line.style.size * 0.5;
    let top = line.y + (line.height - bar) / 2.0;
    if let Some(rect) = Rect::from_xywh(line.x, top, line.width.max(0.5), bar) {
        pixmap.fill_rect(rect, &paint(greek_tone(line.style.color)), transform, None);
    }
}

/// Greeked bars are lighter than the text they stand for.
fn greek_tone(color: [u8; 3]) -> [u8; 3] {
    color.map(|c| c + (255 - c) / 3)
}

fn draw_line(pixmap: &mut Pixmap, face: &Face<'_>, line: &LineBox, transform: Transform) {
    let size = line.style.size;
    let units_per_em = f32::from(face.units_per_em().max(1));
    let scale = size / units_per_em;
    let baseline = line.y + (line.height - size) / 2.0 + size * ASCENT;
    let text_paint = paint(line.style.color);
    // Synthetic bold: a second pass shifted right.
    let bold_shift = line.style.bold.then_some(size * 0.04);

    let mut pen_x = line.x;
    for ch in line.text.chars() {
        let glyph = face.glyph_index(ch).unwrap_or(GlyphId(0));
        if glyph.0 != 0 {
            for shift in std::iter::once(0.0).chain(bold_shift) {
                let mut builder = GlyphPathBuilder::new(pen_x + shift, baseline, scale);
                if face.outline_glyph(glyph, &mut builder).is_none() {
                    continue;
                }
                if let Some(path) = builder.finish() {
                    pixmap.fill_path(
                        &path,
                        &text_paint,
                        tiny_skia::FillRule::Winding,
                        transform,
                        None,
                    );
                }
            }
        }
        let advance = face
            .glyph_hor_advance(glyph)
            .map(|a| f32::from(a) * scale)
            .filter(|a| *a > 0.0)
            .unwrap_or(size * 0.5);
        pen_x += advance;
    }
}

/// Feeds font outlines into a tiny-skia path. Font units point up, surface y points down.
struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            origin_y,
            scale,
        }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.origin_y - y * self.scale)
    }

    fn finish(self) -> Option<tiny_skia::Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x, y) = self.point(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x2, y2) = self.point(x2, y2);
        let (x, y) = self.point(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
