//! Freehand brushes for the pencil and eraser tools.

use crate::canvas::EraserStroke;
use crate::shapes::{Freehand, SerializableColor, Shape, ShapeStyle};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// What a committed stroke turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushKind {
    /// Commits a `path` object.
    Pencil,
    /// Commits an erasure on every object it crosses.
    Eraser,
}

/// A stroke produced by releasing a brush.
#[derive(Debug, Clone)]
pub enum Stroke {
    Path(Shape),
    Erase(EraserStroke),
}

/// Brush installed while a freehand tool is active.
#[derive(Debug, Clone)]
pub struct FreehandBrush {
    pub kind: BrushKind,
    pub color: SerializableColor,
    pub width: f64,
    points: Vec<Point>,
}

impl FreehandBrush {
    /// RDP tolerance applied to pencil strokes on release.
    pub const DECIMATE_TOLERANCE: f64 = 0.4;

    pub fn new(kind: BrushKind, color: SerializableColor, width: f64) -> Self {
        Self {
            kind,
            color,
            width,
            points: Vec::new(),
        }
    }

    /// Start a new stroke, discarding any unfinished one.
    pub fn begin(&mut self, point: Point) {
        self.points.clear();
        self.points.push(point);
    }

    /// Extend the stroke. Repeated points are dropped.
    pub fn extend(&mut self, point: Point) {
        if self.points.is_empty() {
            return;
        }
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    /// Points of the stroke in progress.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_stroking(&self) -> bool {
        !self.points.is_empty()
    }

    /// Drop the stroke in progress.
    pub fn cancel(&mut self) {
        self.points.clear();
    }

    /// Finish the stroke. Returns `None` when no stroke was started.
    pub fn finish(&mut self) -> Option<Stroke> {
        if self.points.is_empty() {
            return None;
        }
        let points = std::mem::take(&mut self.points);
        let stroke = match self.kind {
            BrushKind::Pencil => {
                let mut path = Freehand::from_points(points);
                path.simplify(Self::DECIMATE_TOLERANCE);
                path.style = ShapeStyle {
                    stroke_color: self.color,
                    stroke_width: self.width,
                    fill_color: None,
                    opacity: 1.0,
                };
                Stroke::Path(Shape::Freehand(path))
            }
            BrushKind::Eraser => Stroke::Erase(EraserStroke::new(points, self.width)),
        };
        Some(stroke)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pencil_stroke_is_decimated() {
        let mut brush = FreehandBrush::new(BrushKind::Pencil, SerializableColor::black(), 5.0);
        brush.begin(Point::new(0.0, 0.0));
        for x in 1..=10 {
            brush.extend(Point::new(x as f64, 0.1 * (x % 2) as f64));
        }

        let Some(Stroke::Path(Shape::Freehand(path))) = brush.finish() else {
            panic!("expected a path");
        };
        assert_eq!(path.points.len(), 2);
        assert_eq!(path.style.stroke_width, 5.0);
        assert!(!brush.is_stroking());
    }

    #[test]
    fn test_single_point_stroke_commits_a_dot() {
        let mut brush = FreehandBrush::new(BrushKind::Pencil, SerializableColor::black(), 3.0);
        brush.begin(Point::new(4.0, 4.0));
        brush.extend(Point::new(4.0, 4.0));

        let Some(Stroke::Path(Shape::Freehand(path))) = brush.finish() else {
            panic!("expected a path");
        };
        assert_eq!(path.points, vec![Point::new(4.0, 4.0)]);
    }

    #[test]
    fn test_eraser_stroke_keeps_width() {
        let mut brush = FreehandBrush::new(BrushKind::Eraser, SerializableColor::black(), 12.0);
        brush.begin(Point::new(0.0, 0.0));
        brush.extend(Point::new(5.0, 5.0));

        let Some(Stroke::Erase(stroke)) = brush.finish() else {
            panic!("expected an erasure");
        };
        assert_eq!(stroke.width, 12.0);
        assert_eq!(stroke.points.len(), 2);
    }

    #[test]
    fn test_finish_without_begin() {
        let mut brush = FreehandBrush::new(BrushKind::Eraser, SerializableColor::black(), 1.0);
        brush.extend(Point::new(1.0, 1.0));
        assert!(brush.finish().is_none());
    }
}
