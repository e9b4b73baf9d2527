//! Axis-aligned ellipses.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Ellipse as KurboEllipse, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ellipse stored by center and radii. Drawn inscribed in the dragged box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ellipse {
    pub(crate) id: ShapeId,
    pub center: Point,
    pub radius_x: f64,
    pub radius_y: f64,
    pub style: ShapeStyle,
}

impl Ellipse {
    pub fn new(center: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius_x,
            radius_y,
            style: ShapeStyle::default(),
        }
    }

    /// Refit the ellipse into a bounding rectangle.
    pub fn set_rect(&mut self, rect: Rect) {
        let rect = rect.abs();
        self.center = rect.center();
        self.radius_x = rect.width() / 2.0;
        self.radius_y = rect.height() / 2.0;
    }

    fn outline(&self) -> KurboEllipse {
        KurboEllipse::new(self.center, (self.radius_x, self.radius_y), 0.0)
    }
}

impl ShapeTrait for Ellipse {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, (self.radius_x * 2.0, self.radius_y * 2.0))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let reach = tolerance + self.style.stroke_width / 2.0;
        let offset = point - self.center;
        let inside = |rx: f64, ry: f64| {
            rx > f64::EPSILON
                && ry > f64::EPSILON
                && (offset.x / rx).powi(2) + (offset.y / ry).powi(2) <= 1.0
        };
        if !inside(self.radius_x + reach, self.radius_y + reach) {
            return false;
        }
        // Unfilled ellipses are only hit on their ring
        self.style.fill_color.is_some() || !inside(self.radius_x - reach, self.radius_y - reach)
    }

    fn to_path(&self) -> BezPath {
        self.outline().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        let [sx, _, _, sy, _, _] = affine.as_coeffs();
        self.center = affine * self.center;
        self.radius_x *= sx.abs();
        self.radius_y *= sy.abs();
    }
}
