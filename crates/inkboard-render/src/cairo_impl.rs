//! Cairo renderer implementation.

use crate::renderer::{Layer, RenderContext, RenderResult, Renderer, RendererError};
use cairo::{Antialias, Context, Filter, Format, ImageSurface, LineCap, LineJoin, Operator};
use image::{Rgba, RgbaImage};
use inkboard_core::canvas::EraserStroke;
use inkboard_core::shapes::{Image, Shape, ShapeId, ShapeStyle, ShapeTrait, Text};
use kurbo::{BezPath, PathEl, Point, QuadBez};
use peniko::Color;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Pango family used for text objects.
const TEXT_FAMILY: &str = "Sans";

/// Decoded pixels of one image object.
struct CachedImage {
    /// Hash of the base64 payload the surface was decoded from.
    digest: u64,
    surface: ImageSurface,
}

/// Renders documents with cairo.
#[derive(Default)]
pub struct CairoRenderer {
    images: HashMap<ShapeId, CachedImage>,
}

impl CairoRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render into a premultiplied ARGB32 surface.
    pub(crate) fn render_surface(&mut self, ctx: &RenderContext) -> RenderResult<ImageSurface> {
        if ctx.width == 0 || ctx.height == 0 {
            return Err(RendererError::RenderFailed(format!(
                "invalid canvas size {}x{}",
                ctx.width, ctx.height
            )));
        }
        let surface = ImageSurface::create(Format::ARgb32, ctx.width as i32, ctx.height as i32)?;
        let doc = ctx.document;
        self.images.retain(|id, _| {
            doc.background_image.as_ref().is_some_and(|bg| bg.id() == *id)
                || doc.get_shape(*id).is_some()
        });

        let cr = Context::new(&surface)?;
        match ctx.layer {
            Layer::Base(live) => {
                set_source(&cr, ctx.background_color.into());
                cr.paint()?;
                if let Some(background) = &doc.background_image {
                    self.paint_image(&cr, background)?;
                }
                for shape in doc.shapes_ordered().filter(|s| !live.contains(&s.id())) {
                    self.draw_shape(&cr, shape, doc.erasures_for(shape.id()))?;
                }
            }
            Layer::Live(live) => {
                for shape in doc.shapes_ordered().filter(|s| live.contains(&s.id())) {
                    self.draw_shape(&cr, shape, doc.erasures_for(shape.id()))?;
                }
            }
        }
        drop(cr);
        surface.flush();
        Ok(surface)
    }

    /// Draw one object. Its eraser strokes punch through it and nothing else.
    fn draw_shape(&mut self, cr: &Context, shape: &Shape, erasures: &[EraserStroke]) -> RenderResult<()> {
        if erasures.is_empty() {
            return self.paint_shape(cr, shape);
        }
        cr.push_group();
        self.paint_shape(cr, shape)?;
        cr.set_operator(Operator::DestOut);
        cr.set_source_rgba(0.0, 0.0, 0.0, 1.0);
        cr.set_line_cap(LineCap::Round);
        cr.set_line_join(LineJoin::Round);
        for stroke in erasures {
            trace_polyline(cr, &stroke.points);
            cr.set_line_width(stroke.width);
            cr.stroke()?;
        }
        cr.set_operator(Operator::Over);
        cr.pop_group_to_source()?;
        cr.paint()?;
        Ok(())
    }

    fn paint_shape(&mut self, cr: &Context, shape: &Shape) -> RenderResult<()> {
        match shape {
            Shape::Image(image) => self.paint_image(cr, image),
            Shape::Text(text) => paint_text(cr, text),
            Shape::Freehand(stroke) => {
                trace_polyline(cr, &stroke.points);
                stroke_current(cr, &stroke.style, false)
            }
            Shape::Line(line) => {
                trace_polyline(cr, &[line.start, line.end]);
                stroke_current(cr, &line.style, false)
            }
            _ => {
                let style = shape.style();
                trace_path(cr, &shape.to_path());
                if let Some(fill) = style.fill() {
                    set_source(cr, fill);
                    cr.fill_preserve()?;
                }
                stroke_current(cr, style, true)
            }
        }
    }

    fn decoded(&mut self, image: &Image) -> Option<ImageSurface> {
        let digest = payload_digest(&image.data_base64);
        let cached = self.images.get(&image.id()).filter(|c| c.digest == digest);
        if let Some(cached) = cached {
            return Some(cached.surface.clone());
        }
        let surface = image
            .data()
            .map_err(|e| e.to_string())
            .and_then(|bytes| image::load_from_memory(&bytes).map_err(|e| e.to_string()))
            .and_then(|pixels| rgba_to_surface(&pixels.to_rgba8()).map_err(|e| e.to_string()));
        match surface {
            Ok(surface) => {
                self.images.insert(
                    image.id(),
                    CachedImage {
                        digest,
                        surface: surface.clone(),
                    },
                );
                Some(surface)
            }
            Err(e) => {
                log::warn!("Skipping undecodable image {}: {}", image.id(), e);
                None
            }
        }
    }

    fn paint_image(&mut self, cr: &Context, image: &Image) -> RenderResult<()> {
        let rect = image.as_rect();
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return Ok(());
        }
        let Some(surface) = self.decoded(image) else {
            return Ok(());
        };
        cr.save()?;
        cr.translate(rect.x0, rect.y0);
        cr.scale(
            rect.width() / surface.width() as f64,
            rect.height() / surface.height() as f64,
        );
        cr.set_source_surface(&surface, 0.0, 0.0)?;
        cr.source().set_filter(Filter::Good);
        cr.paint_with_alpha(image.style.opacity.clamp(0.0, 1.0))?;
        cr.restore()?;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<RgbaImage> {
        let mut surface = self.render_surface(ctx)?;
        surface_to_rgba(&mut surface)
    }
}

fn set_source(cr: &Context, color: Color) {
    let [r, g, b, a] = color.components;
    cr.set_source_rgba(r as f64, g as f64, b as f64, a as f64);
}

/// Stroke and clear the current path. Open paths get round caps.
fn stroke_current(cr: &Context, style: &ShapeStyle, closed: bool) -> RenderResult<()> {
    if style.stroke_width <= 0.0 || style.stroke_color.a == 0 {
        cr.new_path();
        return Ok(());
    }
    set_source(cr, style.stroke());
    cr.set_line_width(style.stroke_width);
    if closed {
        cr.set_line_join(LineJoin::Miter);
        cr.set_line_cap(LineCap::Butt);
    } else {
        cr.set_line_join(LineJoin::Round);
        cr.set_line_cap(LineCap::Round);
    }
    cr.stroke()?;
    Ok(())
}

fn trace_path(cr: &Context, path: &BezPath) {
    cr.new_path();
    let mut last = Point::ZERO;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                cr.move_to(p.x, p.y);
                last = p;
            }
            PathEl::LineTo(p) => {
                cr.line_to(p.x, p.y);
                last = p;
            }
            PathEl::QuadTo(c, p) => {
                let cubic = QuadBez::new(last, c, p).raise();
                cr.curve_to(cubic.p1.x, cubic.p1.y, cubic.p2.x, cubic.p2.y, p.x, p.y);
                last = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                cr.curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y);
                last = p;
            }
            PathEl::ClosePath => cr.close_path(),
        }
    }
}

/// Trace a polyline. A single point becomes a zero-length segment so round caps draw a dot.
fn trace_polyline(cr: &Context, points: &[Point]) {
    cr.new_path();
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    cr.move_to(first.x, first.y);
    if rest.is_empty() {
        cr.line_to(first.x, first.y);
    }
    for p in rest {
        cr.line_to(p.x, p.y);
    }
}

fn paint_text(cr: &Context, text: &Text) -> RenderResult<()> {
    if text.content.is_empty() {
        return Ok(());
    }
    let color = text.style.fill().unwrap_or_else(|| text.style.stroke());
    cr.save()?;
    cr.set_antialias(Antialias::Best);

    let layout = pangocairo::functions::create_layout(cr);
    let mut font = pango::FontDescription::from_string(TEXT_FAMILY);
    font.set_absolute_size(text.font_size * pango::SCALE as f64);
    layout.set_font_description(Some(&font));
    layout.set_text(&text.content);

    set_source(cr, color);
    cr.move_to(text.position.x, text.position.y);
    pangocairo::functions::show_layout(cr, &layout);
    cr.restore()?;
    Ok(())
}

fn payload_digest(data: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    hasher.finish()
}

/// Copy straight-alpha RGBA pixels into a new premultiplied ARGB32 surface.
fn rgba_to_surface(pixels: &RgbaImage) -> RenderResult<ImageSurface> {
    let mut surface =
        ImageSurface::create(Format::ARgb32, pixels.width() as i32, pixels.height() as i32)?;
    let stride = surface.stride() as usize;
    {
        let mut data = surface
            .data()
            .map_err(|e| RendererError::RenderFailed(e.to_string()))?;
        for (x, y, &Rgba([r, g, b, a])) in pixels.enumerate_pixels() {
            let premultiply = |c: u8| (c as u32 * a as u32 + 127) / 255;
            let argb = (a as u32) << 24 | premultiply(r) << 16 | premultiply(g) << 8 | premultiply(b);
            let i = y as usize * stride + x as usize * 4;
            data[i..i + 4].copy_from_slice(&argb.to_ne_bytes());
        }
    }
    Ok(surface)
}

fn surface_to_rgba(surface: &mut ImageSurface) -> RenderResult<RgbaImage> {
    let (width, height) = (surface.width() as u32, surface.height() as u32);
    let stride = surface.stride() as usize;
    let data = surface
        .data()
        .map_err(|e| RendererError::RenderFailed(e.to_string()))?;
    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let i = y as usize * stride + x as usize * 4;
        let argb = u32::from_ne_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);
        let a = argb >> 24;
        let unpremultiply = |shift: u32| match a {
            0 => 0,
            _ => ((((argb >> shift) & 0xFF) * 255 + a / 2) / a).min(255) as u8,
        };
        Rgba([unpremultiply(16), unpremultiply(8), unpremultiply(0), a as u8])
    }))
}
