//! Select tool gestures: click to select, drag to move, marquee to select many.

use crate::canvas::Canvas;
use crate::input::Modifiers;
use crate::tools::{ToolManager, ToolState};
use kurbo::{Point, Rect};

/// Pointer slop used when picking objects.
pub const HIT_TOLERANCE: f64 = 4.0;

/// Press with the select tool.
pub fn press(canvas: &mut Canvas, tools: &mut ToolManager, point: Point, modifiers: Modifiers) {
    match canvas.selectable_at_point(point, HIT_TOLERANCE) {
        Some(id) => {
            if modifiers.shift && canvas.multi_select() {
                canvas.toggle_selection(id);
            } else if !canvas.is_selected(id) {
                canvas.select(id);
            }
            if canvas.is_selected(id) {
                tools.state = ToolState::Moving { last: point };
            }
        }
        None => {
            if !modifiers.shift {
                canvas.clear_selection();
            }
            tools.state = ToolState::Marquee {
                origin: point,
                current: point,
            };
        }
    }
}

/// Pointer move with the select tool. Returns true when the document changed.
pub fn drag(canvas: &mut Canvas, tools: &mut ToolManager, point: Point) -> bool {
    match &mut tools.state {
        ToolState::Moving { last } => {
            let delta = point - *last;
            *last = point;
            if delta.hypot2() > 0.0 {
                canvas.move_selected(delta);
                return true;
            }
            false
        }
        ToolState::Marquee { current, .. } => {
            *current = point;
            false
        }
        _ => false,
    }
}

/// Release with the select tool. Returns true when the selection changed.
pub fn release(canvas: &mut Canvas, tools: &mut ToolManager, point: Point) -> bool {
    drag(canvas, tools, point);
    match tools.end() {
        ToolState::Marquee { origin, current } => {
            let rect = Rect::from_points(origin, current);
            if rect.area() <= 0.0 {
                return false;
            }
            for id in canvas.selectable_in_rect(rect) {
                canvas.add_to_selection(id);
            }
            true
        }
        _ => false,
    }
}

/// Marquee being dragged, if any.
pub fn marquee(tools: &ToolManager) -> Option<Rect> {
    match tools.state {
        ToolState::Marquee { origin, current } => Some(Rect::from_points(origin, current)),
        _ => None,
    }
}
