//! Straight line segments.

use super::{ShapeId, ShapeStyle, ShapeTrait, point_to_segment_dist};
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A segment from `start` to `end`. The endpoints keep the direction it was drawn in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub(crate) id: ShapeId,
    pub start: Point,
    pub end: Point,
    pub style: ShapeStyle,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            style: ShapeStyle::default(),
        }
    }
}

impl ShapeTrait for Line {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let reach = tolerance + self.style.stroke_width / 2.0;
        point_to_segment_dist(point, self.start, self.end) <= reach
    }

    fn to_path(&self) -> BezPath {
        BezPath::from_vec(vec![
            kurbo::PathEl::MoveTo(self.start),
            kurbo::PathEl::LineTo(self.end),
        ])
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.start = affine * self.start;
        self.end = affine * self.end;
    }
}
