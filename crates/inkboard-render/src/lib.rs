//! Inkboard Render Library
//!
//! Renderer abstraction and a cairo backend for Inkboard documents, used both
//! for on-screen display and PNG export.

mod cairo_impl;
mod export;
mod renderer;

pub use cairo_impl::CairoRenderer;
pub use export::export_png;
pub use renderer::{Layer, RenderContext, RenderResult, Renderer, RendererError};
