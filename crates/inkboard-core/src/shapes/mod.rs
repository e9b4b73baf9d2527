//! Shape definitions for the whiteboard.

mod ellipse;
mod freehand;
mod image;
mod line;
mod rectangle;
mod text;
mod triangle;

pub use ellipse::Ellipse;
pub use freehand::Freehand;
pub use image::{Image, ImageError, ImageFormat};
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::Text;
pub use triangle::Triangle;

#[cfg(test)]
pub(crate) use image::tests::png_bytes;

use kurbo::{Affine, BezPath, ParamCurveNearest, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = channel(0..1)? * 17;
                let g = channel(1..2)? * 17;
                let b = channel(2..3)? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl ShapeStyle {
    /// Stroke color with the style's opacity applied.
    pub fn stroke(&self) -> Color {
        Color::from(self.stroke_color).multiply_alpha(self.opacity.clamp(0.0, 1.0) as f32)
    }

    /// Fill color with the style's opacity applied.
    pub fn fill(&self) -> Option<Color> {
        self.fill_color
            .map(|c| Color::from(c).multiply_alpha(self.opacity.clamp(0.0, 1.0) as f32))
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: None,
            opacity: 1.0,
        }
    }
}

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Distance from a point to the segment `a`-`b`.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    if a == b {
        return point.distance(a);
    }
    kurbo::Line::new(a, b).nearest(point, 1e-9).distance_sq.sqrt()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [single] => point.distance(*single),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the bounding box in canvas coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point hits this shape.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Get the outline path used for filling and stroking.
    fn to_path(&self) -> BezPath;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Apply a transform to this shape.
    fn transform(&mut self, affine: Affine);
}

/// Enum wrapper for all shape types (for serialization).
///
/// Serialized with an internal `type` tag, so every object in a document
/// reads as `{"type": "rect", "id": ..., ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    #[serde(rename = "rect")]
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Triangle(Triangle),
    Line(Line),
    #[serde(rename = "path")]
    Freehand(Freehand),
    Text(Text),
    Image(Image),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Shape::Rectangle($s) => $body,
            Shape::Ellipse($s) => $body,
            Shape::Triangle($s) => $body,
            Shape::Line($s) => $body,
            Shape::Freehand($s) => $body,
            Shape::Text($s) => $body,
            Shape::Image($s) => $body,
        }
    };
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        dispatch!(self, s => s.id())
    }

    pub fn bounds(&self) -> Rect {
        dispatch!(self, s => s.bounds())
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        dispatch!(self, s => s.hit_test(point, tolerance))
    }

    pub fn to_path(&self) -> BezPath {
        dispatch!(self, s => s.to_path())
    }

    pub fn style(&self) -> &ShapeStyle {
        dispatch!(self, s => s.style())
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        dispatch!(self, s => s.style_mut())
    }

    pub fn transform(&mut self, affine: Affine) {
        dispatch!(self, s => s.transform(affine))
    }

    /// The serialized `type` tag of this shape.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Shape::Rectangle(_) => "rect",
            Shape::Ellipse(_) => "ellipse",
            Shape::Triangle(_) => "triangle",
            Shape::Line(_) => "line",
            Shape::Freehand(_) => "path",
            Shape::Text(_) => "text",
            Shape::Image(_) => "image",
        }
    }

    /// Whether a marquee rectangle touches this shape. Lines are clipped
    /// against the rectangle; everything else compares bounding boxes.
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        match self {
            Shape::Line(line) => segment_hits_rect(line.start, line.end, rect),
            _ => rect.intersect(self.bounds().inflate(1.0, 1.0)).area() > 0.0,
        }
    }

    /// Get the text if this shape is a text object.
    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Shape::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get the image if this shape is an image.
    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Shape::Image(img) => Some(img),
            _ => None,
        }
    }
}

/// Liang-Barsky clip of the segment `a`-`b` against `rect`.
fn segment_hits_rect(a: Point, b: Point, rect: Rect) -> bool {
    let d = b - a;
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    let edges = [
        (-d.x, a.x - rect.x0),
        (d.x, rect.x1 - a.x),
        (-d.y, a.y - rect.y0),
        (d.y, rect.y1 - a.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return false;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return false;
        }
    }
    true
}
