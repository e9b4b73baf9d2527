//! Text shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An editable block of text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Position (top-left corner of text bounding box).
    pub position: Point,
    /// The text content. Lines are separated by `\n`.
    pub content: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Style properties. Glyphs are painted with the fill color, falling back to stroke.
    pub style: ShapeStyle,
}

impl Text {
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    /// Line height as a multiple of the font size.
    pub const LINE_HEIGHT: f64 = 1.16;

    /// Average glyph advance as a multiple of the font size, used for layout-free bounds.
    const APPROX_ADVANCE: f64 = 0.6;

    /// Create a new text shape.
    pub fn new(position: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            style: ShapeStyle::default(),
        }
    }

    /// Number of lines (at least one, even when empty).
    pub fn line_count(&self) -> usize {
        self.content.lines().count().max(1)
    }

    /// Approximate rendered size (width, height).
    pub fn approx_size(&self) -> (f64, f64) {
        let longest = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
            .max(1);
        (
            longest as f64 * self.font_size * Self::APPROX_ADVANCE,
            self.line_count() as f64 * self.font_size * Self::LINE_HEIGHT,
        )
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let (width, height) = self.approx_size();
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + width,
            self.position.y + height,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        // Bounding box only; glyph outlines come from the renderer
        self.bounds().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
        let scale = affine.as_coeffs()[3].abs();
        if scale > f64::EPSILON {
            self.font_size *= scale;
        }
    }
}
