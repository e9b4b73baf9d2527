//! Axis-aligned rectangles.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serialized with the `rect` tag. `position` is always the top-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub style: ShapeStyle,
}

impl Rectangle {
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            style: ShapeStyle::default(),
        }
    }

    /// Span the box between two arbitrary corners.
    pub fn set_corners(&mut self, p1: Point, p2: Point) {
        let rect = Rect::from_points(p1, p2);
        self.position = rect.origin();
        self.width = rect.width();
        self.height = rect.height();
    }

    pub fn as_rect(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let rect = self.as_rect();
        if self.style.fill_color.is_some() {
            return rect.inflate(tolerance, tolerance).contains(point);
        }
        // Unfilled rectangles are only hit on their border band
        let reach = tolerance + self.style.stroke_width / 2.0;
        rect.inflate(reach, reach).contains(point) && !rect.inflate(-reach, -reach).contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        let [sx, _, _, sy, _, _] = affine.as_coeffs();
        self.position = affine * self.position;
        self.width *= sx.abs();
        self.height *= sy.abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::SerializableColor;

    #[test]
    fn test_set_corners_normalizes() {
        let mut rect = Rectangle::new(Point::ZERO, 0.0, 0.0);
        rect.set_corners(Point::new(160.0, 170.0), Point::new(100.0, 100.0));
        assert_eq!(rect.position, Point::new(100.0, 100.0));
        assert_eq!((rect.width, rect.height), (60.0, 70.0));
    }

    #[test]
    fn test_zero_size_while_pressing() {
        let mut rect = Rectangle::new(Point::ZERO, 5.0, 5.0);
        rect.set_corners(Point::new(10.0, 10.0), Point::new(10.0, 10.0));
        assert_eq!(rect.bounds(), Rect::new(10.0, 10.0, 10.0, 10.0));
    }

    #[test]
    fn test_outline_hit_band() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        assert!(rect.hit_test(Point::new(0.0, 50.0), 0.0));
        assert!(!rect.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(rect.hit_test(Point::new(105.0, 50.0), 5.0));
    }

    #[test]
    fn test_filled_hit_interior() {
        let mut rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        rect.style.fill_color = Some(SerializableColor::black());
        assert!(rect.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(!rect.hit_test(Point::new(150.0, 50.0), 0.0));
    }

    #[test]
    fn test_translate() {
        let mut rect = Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0);
        rect.transform(Affine::translate((5.0, -5.0)));
        assert_eq!(rect.bounds(), Rect::new(15.0, 15.0, 115.0, 65.0));
    }
}
