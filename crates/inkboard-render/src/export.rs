//! PNG export.

use crate::cairo_impl::CairoRenderer;
use crate::renderer::{RenderContext, RenderResult, RendererError};
use inkboard_core::canvas::CanvasDocument;

/// Rasterize a document onto a white `width` x `height` page and encode it as PNG.
pub fn export_png(document: &CanvasDocument, width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let ctx = RenderContext::new(document, width, height);
    let surface = CairoRenderer::new().render_surface(&ctx)?;

    let mut png_data = Vec::new();
    surface
        .write_to_png(&mut png_data)
        .map_err(|e| RendererError::Encode(e.to_string()))?;
    log::debug!("Encoded {}x{} PNG ({} bytes)", width, height, png_data.len());
    Ok(png_data)
}
