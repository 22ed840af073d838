//! PDF assembly from page images.
//!
//! Every image gets its own A4 page. It is scaled to fit the page with its aspect ratio
//! preserved, centered horizontally and aligned to the top edge.

use image::ImageFormat;
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};

use crate::export::ExportError;

pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

const IMAGE_NAME: Name<'static> = Name(b"Im0");

/// Where an image lands on a page, in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Scales an image to fit the page, keeping its aspect ratio; centered, top-aligned.
pub fn fit_image(image_width: f32, image_height: f32, page_width: f32, page_height: f32) -> Placement {
    if image_width <= 0.0 || image_height <= 0.0 {
        return Placement {
            x: page_width / 2.0,
            y: page_height,
            width: 0.0,
            height: 0.0,
        };
    }
    let scale = (page_width / image_width).min(page_height / image_height);
    let width = image_width * scale;
    let height = image_height * scale;
    Placement {
        x: (page_width - width) / 2.0,
        y: page_height - height,
        width,
        height,
    }
}

/// Builds a PDF one image page at a time.
pub struct DocumentAssembler {
    pdf: Pdf,
    next_id: i32,
    catalog_id: Ref,
    page_tree_id: Ref,
    pages: Vec<Ref>,
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentAssembler {
    pub fn new() -> Self {
        DocumentAssembler {
            pdf: Pdf::new(),
            next_id: 3,
            catalog_id: Ref::new(1),
            page_tree_id: Ref::new(2),
            pages: Vec::new(),
        }
    }

    fn alloc(&mut self) -> Ref {
        let id = Ref::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Decodes a PNG and appends it as a new page. `page` is only used in errors.
    pub fn add_png(&mut self, page: usize, png: &[u8]) -> Result<(), ExportError> {
        let decoded = image::load_from_memory_with_format(png, ImageFormat::Png).map_err(|e| {
            ExportError::Decode {
                page,
                reason: e.to_string(),
            }
        })?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        let data = compress_to_vec_zlib(rgb.as_raw(), CompressionLevel::DefaultLevel as u8);

        let page_id = self.alloc();
        let image_id = self.alloc();
        let content_id = self.alloc();

        let mut xobject = self.pdf.image_xobject(image_id, &data);
        xobject.filter(Filter::FlateDecode);
        xobject.width(width as i32);
        xobject.height(height as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
        xobject.finish();

        let placement = fit_image(width as f32, height as f32, A4_WIDTH_PT, A4_HEIGHT_PT);
        let mut content = Content::new();
        content.save_state();
        content.transform([
            placement.width,
            0.0,
            0.0,
            placement.height,
            placement.x,
            placement.y,
        ]);
        content.x_object(IMAGE_NAME);
        content.restore_state();
        self.pdf.stream(content_id, &content.finish());

        let mut page_writer = self.pdf.page(page_id);
        page_writer.media_box(Rect::new(0.0, 0.0, A4_WIDTH_PT, A4_HEIGHT_PT));
        page_writer.parent(self.page_tree_id);
        page_writer.contents(content_id);
        page_writer.resources().x_objects().pair(IMAGE_NAME, image_id);
        page_writer.finish();

        self.pages.push(page_id);
        Ok(())
    }

    /// Writes the page tree and catalog and returns the file bytes.
    pub fn finish(mut self) -> Vec<u8> {
        let count = self.pages.len() as i32;
        self.pdf
            .pages(self.page_tree_id)
            .kids(self.pages.iter().copied())
            .count(count);
        self.pdf.catalog(self.catalog_id).pages(self.page_tree_id);
        self.pdf.finish()
    }
}
