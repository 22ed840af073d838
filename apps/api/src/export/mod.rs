// Export: page surfaces to PNG files or a single PDF.

pub mod handlers;
pub mod pdf;

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::render::{PageStack, RasterError, Rasterizer, PAGE_SURFACE_MARKER};

pub use pdf::DocumentAssembler;

/// Base name used when the user leaves the name prompt blank.
pub const DEFAULT_FILE_NAME: &str = "markdown";

pub const PNG_CONTENT_TYPE: &str = "image/png";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("rasterization failed: {0}")]
    Raster(#[from] RasterError),

    #[error("page image {page} could not be decoded: {reason}")]
    Decode { page: usize, reason: String },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One downloadable file.
#[derive(Debug, Clone, Serialize)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    #[serde(skip)]
    pub bytes: Bytes,
}

/// Resolves the name prompt. `None` means the prompt was declined and nothing is exported;
/// a blank answer falls back to `DEFAULT_FILE_NAME`. Path separators and control characters
/// become `-` and quotes are dropped, so the name stays a single path component and is
/// usable verbatim in a `Content-Disposition` header.
pub fn resolve_file_name(input: Option<&str>) -> Option<String> {
    let trimmed = input?.trim();
    if trimmed.is_empty() {
        return Some(DEFAULT_FILE_NAME.to_string());
    }
    let name: String = trimmed
        .chars()
        .filter(|c| *c != '"')
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '-' } else { c })
        .collect();
    if name.is_empty() {
        return Some(DEFAULT_FILE_NAME.to_string());
    }
    Some(name)
}

/// `{name}.png` for a single page, `{name}-{n}.png` (1-based) otherwise.
pub fn png_file_names(name: &str, count: usize) -> Vec<String> {
    match count {
        0 => Vec::new(),
        1 => vec![format!("{name}.png")],
        _ => (1..=count).map(|n| format!("{name}-{n}.png")).collect(),
    }
}

/// Rasterizes every page surface of the stack, in order.
pub fn rasterize_pages(rasterizer: &Rasterizer, stack: &PageStack) -> Result<Vec<Vec<u8>>, ExportError> {
    debug!(surfaces = stack.len(), scale = rasterizer.scale(), "rasterizing");
    stack
        .select(PAGE_SURFACE_MARKER)
        .map(|surface| rasterizer.rasterize(surface).map_err(ExportError::from))
        .collect()
}

/// One PNG per page surface. No surfaces, no files.
pub fn export_png(
    rasterizer: &Rasterizer,
    stack: &PageStack,
    name: &str,
) -> Result<Vec<ExportFile>, ExportError> {
    let images = rasterize_pages(rasterizer, stack)?;
    let names = png_file_names(name, images.len());
    let files: Vec<ExportFile> = names
        .into_iter()
        .zip(images)
        .map(|(file_name, png)| ExportFile {
            file_name,
            content_type: PNG_CONTENT_TYPE,
            bytes: Bytes::from(png),
        })
        .collect();
    info!(files = files.len(), name, "png export");
    Ok(files)
}

/// All page surfaces assembled into `{name}.pdf`, one A4 page each. No surfaces, no file.
pub fn export_pdf(
    rasterizer: &Rasterizer,
    stack: &PageStack,
    name: &str,
) -> Result<Option<ExportFile>, ExportError> {
    let images = rasterize_pages(rasterizer, stack)?;
    if images.is_empty() {
        return Ok(None);
    }
    let mut assembler = DocumentAssembler::new();
    for (page, png) in images.iter().enumerate() {
        assembler.add_png(page, png)?;
    }
    let pages = assembler.page_count();
    let bytes = assembler.finish();
    info!(pages, bytes = bytes.len(), name, "pdf export");
    Ok(Some(ExportFile {
        file_name: format!("{name}.pdf"),
        content_type: PDF_CONTENT_TYPE,
        bytes: Bytes::from(bytes),
    }))
}

/// Writes exported files into `dir`, creating it if needed.
pub async fn write_all(dir: &Path, files: &[ExportFile]) -> Result<(), ExportError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    for file in files {
        let path = dir.join(&file.file_name);
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|source| ExportError::Io { path, source })?;
    }
    Ok(())
}
