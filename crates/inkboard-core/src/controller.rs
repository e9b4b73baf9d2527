//! Mode controller: the active tool and the current drawing style.

use crate::shapes::{SerializableColor, ShapeStyle};
use crate::tools::{BrushKind, EntryAction, PointerBindings, ToolKind, ToolManager};
use std::ops::RangeInclusive;

/// Allowed stroke widths.
pub const WIDTH_RANGE: RangeInclusive<u32> = 1..=20;

/// Result of selecting a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: ToolKind,
    pub to: ToolKind,
    /// Callbacks removed from the previous tool.
    pub unbound: PointerBindings,
    /// Callbacks installed for the new tool.
    pub bound: PointerBindings,
    /// Entry actions the caller must run against the canvas.
    pub entry: &'static [EntryAction],
}

/// Per-whiteboard mode and style state. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeController {
    mode: ToolKind,
    color: SerializableColor,
    width: u32,
    fill: bool,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(SerializableColor::black(), 5, false)
    }
}

impl ModeController {
    pub fn new(color: SerializableColor, width: u32, fill: bool) -> Self {
        Self {
            mode: ToolKind::default(),
            color,
            width: clamp_width(width),
            fill,
        }
    }

    pub fn mode(&self) -> ToolKind {
        self.mode
    }

    pub fn color(&self) -> SerializableColor {
        self.color
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn fill(&self) -> bool {
        self.fill
    }

    /// Switch tools.
    ///
    /// Always unbinds the previous triplet and binds the new one, including
    /// when `tool` is already active.
    pub fn select_tool(&mut self, tool: ToolKind, tools: &mut ToolManager) -> Transition {
        let from = self.mode;
        let unbound = tools.unbind();
        let bound = tools.bind(tool, &self.style());
        self.mode = tool;
        log::debug!("Tool {:?} -> {:?}", from, tool);
        Transition {
            from,
            to: tool,
            unbound,
            bound,
            entry: tool.spec().entry,
        }
    }

    /// Change the drawing color. Updates the pencil brush if installed.
    pub fn set_color(&mut self, color: SerializableColor, tools: &mut ToolManager) {
        self.color = color;
        if let Some(brush) = tools.brush_mut() {
            if brush.kind == BrushKind::Pencil {
                brush.color = color;
            }
        }
    }

    /// Change the stroke width, clamped to [`WIDTH_RANGE`]. Updates the brush if installed.
    pub fn set_width(&mut self, width: u32, tools: &mut ToolManager) -> u32 {
        self.width = clamp_width(width);
        if let Some(brush) = tools.brush_mut() {
            brush.width = self.width as f64;
        }
        self.width
    }

    pub fn set_fill(&mut self, fill: bool) {
        self.fill = fill;
    }

    /// Style applied to new shapes.
    pub fn style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke_color: self.color,
            stroke_width: self.width as f64,
            fill_color: self.fill.then_some(self.color),
            opacity: 1.0,
        }
    }

    /// Style applied to new text, which is always filled with the current color.
    pub fn text_style(&self) -> ShapeStyle {
        ShapeStyle {
            fill_color: Some(self.color),
            ..self.style()
        }
    }
}

fn clamp_width(width: u32) -> u32 {
    width.clamp(*WIDTH_RANGE.start(), *WIDTH_RANGE.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerEventKind;

    #[test]
    fn test_select_tool_rebinds() {
        let mut mc = ModeController::default();
        let mut tm = ToolManager::new();

        let t = mc.select_tool(ToolKind::Rectangle, &mut tm);
        assert_eq!((t.from, t.to), (ToolKind::Select, ToolKind::Rectangle));
        assert_eq!(t.unbound, PointerBindings::ALL);
        assert_eq!(t.bound, PointerBindings::ALL);

        let t = mc.select_tool(ToolKind::Text, &mut tm);
        assert_eq!(t.bound, PointerBindings::NONE);
        assert!(!tm.accepts(PointerEventKind::Down));
        assert_eq!(mc.mode(), ToolKind::Text);
    }

    #[test]
    fn test_reselect_never_toggles_to_idle() {
        let mut mc = ModeController::default();
        let mut tm = ToolManager::new();
        mc.select_tool(ToolKind::Pencil, &mut tm);
        let t = mc.select_tool(ToolKind::Pencil, &mut tm);
        assert_eq!(t.to, ToolKind::Pencil);
        assert_eq!(mc.mode(), ToolKind::Pencil);
        assert!(tm.accepts(PointerEventKind::Move));
    }

    #[test]
    fn test_width_is_clamped() {
        let mut mc = ModeController::default();
        let mut tm = ToolManager::new();
        assert_eq!(mc.set_width(0, &mut tm), 1);
        assert_eq!(mc.set_width(50, &mut tm), 20);
        assert_eq!(mc.set_width(7, &mut tm), 7);
        assert_eq!(ModeController::new(SerializableColor::black(), 99, false).width(), 20);
    }

    #[test]
    fn test_style_updates_brush() {
        let mut mc = ModeController::default();
        let mut tm = ToolManager::new();
        mc.select_tool(ToolKind::Pencil, &mut tm);

        let red = SerializableColor::new(255, 0, 0, 255);
        mc.set_color(red, &mut tm);
        mc.set_width(12, &mut tm);
        let brush = tm.brush().unwrap();
        assert_eq!(brush.color, red);
        assert_eq!(brush.width, 12.0);
    }

    #[test]
    fn test_style_uses_fill_flag() {
        let mut mc = ModeController::default();
        assert_eq!(mc.style().fill_color, None);
        mc.set_fill(true);
        assert_eq!(mc.style().fill_color, Some(SerializableColor::black()));
        assert_eq!(mc.style().stroke_width, 5.0);
    }
}
