//! Renderer trait abstraction.

use image::RgbaImage;
use inkboard_core::canvas::CanvasDocument;
use inkboard_core::shapes::{SerializableColor, ShapeId};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Which part of the document a render produces.
///
/// A view keeps the base layer cached while a gesture is running and redraws only
/// the live shapes on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer<'a> {
    /// Page color, background image and every shape except the listed ones.
    Base(&'a [ShapeId]),
    /// Only the listed shapes, on a transparent page.
    Live(&'a [ShapeId]),
}

impl Default for Layer<'_> {
    fn default() -> Self {
        Layer::Base(&[])
    }
}

/// Context for a single render.
pub struct RenderContext<'a> {
    /// The document to render.
    pub document: &'a CanvasDocument,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Page color below the background image.
    pub background_color: SerializableColor,
    pub layer: Layer<'a>,
}

impl<'a> RenderContext<'a> {
    /// Create a context for the whole document on a white page.
    pub fn new(document: &'a CanvasDocument, width: u32, height: u32) -> Self {
        Self {
            document,
            width,
            height,
            background_color: SerializableColor::white(),
            layer: Layer::default(),
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, color: SerializableColor) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_layer(mut self, layer: Layer<'a>) -> Self {
        self.layer = layer;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Rasterize a document into a straight-alpha RGBA8 image of the context's size.
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<RgbaImage>;
}
