//! Triangle shape.

use super::{ShapeId, ShapeStyle, ShapeTrait, point_to_polyline_dist};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An isosceles triangle inscribed in its bounding box: apex at the top center,
/// base along the bottom edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triangle {
    pub(crate) id: ShapeId,
    /// Top-left corner of the bounding box.
    pub position: Point,
    /// Base width.
    pub width: f64,
    /// Height from base to apex.
    pub height: f64,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Triangle {
    /// Create a new triangle.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            style: ShapeStyle::default(),
        }
    }

    /// Resize to span two corner points, keeping the top-left at the min corner.
    pub fn set_corners(&mut self, p1: Point, p2: Point) {
        self.position = Point::new(p1.x.min(p2.x), p1.y.min(p2.y));
        self.width = (p2.x - p1.x).abs();
        self.height = (p2.y - p1.y).abs();
    }

    /// The three vertices: apex, bottom-right, bottom-left.
    pub fn vertices(&self) -> [Point; 3] {
        let Point { x, y } = self.position;
        [
            Point::new(x + self.width / 2.0, y),
            Point::new(x + self.width, y + self.height),
            Point::new(x, y + self.height),
        ]
    }
}

impl ShapeTrait for Triangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let [a, b, c] = self.vertices();
        let outline = [a, b, c, a];
        if point_to_polyline_dist(point, &outline) <= tolerance + self.style.stroke_width / 2.0 {
            return true;
        }
        self.style.fill_color.is_some() && self.to_path().winding(point) != 0
    }

    fn to_path(&self) -> BezPath {
        let [a, b, c] = self.vertices();
        let mut path = BezPath::new();
        path.move_to(a);
        path.line_to(b);
        path.line_to(c);
        path.close_path();
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
        let scale = affine.as_coeffs();
        self.width *= scale[0].abs();
        self.height *= scale[3].abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::SerializableColor;

    #[test]
    fn test_vertices() {
        let tri = Triangle::new(Point::new(0.0, 0.0), 50.0, 70.0);
        let [apex, right, left] = tri.vertices();
        assert_eq!(apex, Point::new(25.0, 0.0));
        assert_eq!(right, Point::new(50.0, 70.0));
        assert_eq!(left, Point::new(0.0, 70.0));
    }

    #[test]
    fn test_set_corners_normalizes() {
        let mut tri = Triangle::new(Point::ZERO, 0.0, 0.0);
        tri.set_corners(Point::new(80.0, 90.0), Point::new(20.0, 30.0));
        assert_eq!(tri.position, Point::new(20.0, 30.0));
        assert!((tri.width - 60.0).abs() < f64::EPSILON);
        assert!((tri.height - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let mut tri = Triangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        assert!(tri.hit_test(Point::new(50.0, 100.0), 1.0));
        assert!(!tri.hit_test(Point::new(50.0, 60.0), 1.0));

        tri.style.fill_color = Some(SerializableColor::black());
        assert!(tri.hit_test(Point::new(50.0, 60.0), 1.0));
        assert!(!tri.hit_test(Point::new(5.0, 5.0), 1.0));
    }
}
