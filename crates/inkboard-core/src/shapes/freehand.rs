//! Pencil strokes stored as polylines.

use super::{ShapeId, ShapeStyle, ShapeTrait, point_to_polyline_dist, point_to_segment_dist};
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A committed pencil stroke. Serialized with the `path` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Freehand {
    pub(crate) id: ShapeId,
    /// Stroke vertices in drawing order. A single vertex is drawn as a dot.
    pub points: Vec<Point>,
    pub style: ShapeStyle,
}

impl Freehand {
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            style: ShapeStyle::default(),
        }
    }

    /// Drop vertices that deviate less than `tolerance` from the simplified line.
    pub fn simplify(&mut self, tolerance: f64) {
        if self.points.len() < 3 {
            return;
        }
        let keep = decimate(&self.points, tolerance);
        let mut flags = keep.iter();
        self.points.retain(|_| flags.next().copied().unwrap_or(false));
    }
}

/// Ramer-Douglas-Peucker over an explicit work stack.
/// Returns one flag per input vertex; the endpoints are always kept.
fn decimate(points: &[Point], tolerance: f64) -> Vec<bool> {
    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut spans = vec![(0, last)];
    while let Some((first, end)) = spans.pop() {
        let farthest = (first + 1..end)
            .map(|i| (i, point_to_segment_dist(points[i], points[first], points[end])))
            .max_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((i, dist)) = farthest {
            if dist > tolerance {
                keep[i] = true;
                spans.push((first, i));
                spans.push((i, end));
            }
        }
    }
    keep
}

impl ShapeTrait for Freehand {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_polyline_dist(point, &self.points) <= tolerance + self.style.stroke_width / 2.0
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for (i, point) in self.points.iter().enumerate() {
            if i == 0 {
                path.move_to(*point);
            } else {
                path.line_to(*point);
            }
        }
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.points.iter_mut().for_each(|p| *p = affine * *p);
    }
}
