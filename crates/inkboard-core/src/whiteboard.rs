//! A whiteboard session: the canvas, the mode controller and the active tool.

use crate::canvas::{Canvas, DocumentError};
use crate::config::WhiteboardConfig;
use crate::controller::{ModeController, Transition};
use crate::input::PointerEvent;
use crate::selection;
use crate::shapes::{Image, ImageError, SerializableColor, Shape, ShapeId, Text};
use crate::tools::{EntryAction, Stroke, ToolKind, ToolManager, ToolState, drag_shape};
use kurbo::Point;

/// Everything a view needs to drive one board.
///
/// Each view owns its own `Whiteboard`; nothing is shared between boards.
#[derive(Debug, Clone)]
pub struct Whiteboard {
    canvas: Canvas,
    controller: ModeController,
    tools: ToolManager,
    config: WhiteboardConfig,
    revision: u64,
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new(WhiteboardConfig::default())
    }
}

impl Whiteboard {
    /// Create a board in select mode.
    pub fn new(config: WhiteboardConfig) -> Self {
        let controller =
            ModeController::new(config.color(), config.default_width, config.default_fill);
        let mut board = Self {
            canvas: Canvas::new(),
            controller,
            tools: ToolManager::new(),
            config,
            revision: 0,
        };
        board.select_tool(ToolKind::Select);
        board.revision = 0;
        board
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn controller(&self) -> &ModeController {
        &self.controller
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn config(&self) -> &WhiteboardConfig {
        &self.config
    }

    pub fn mode(&self) -> ToolKind {
        self.controller.mode()
    }

    /// Incremented whenever the document changes outside the live shapes.
    ///
    /// Edits to [`live_shapes`](Self::live_shapes) during a gesture are counted once,
    /// when the gesture ends. Views keep their rendered document until it moves.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Switch tools and run the new tool's entry actions.
    pub fn select_tool(&mut self, tool: ToolKind) -> Transition {
        let transition = self.controller.select_tool(tool, &mut self.tools);
        for action in transition.entry {
            self.run_entry_action(*action);
        }
        self.touch();
        transition
    }

    fn run_entry_action(&mut self, action: EntryAction) {
        match action {
            EntryAction::UnlockAll => self.canvas.unlock_all(),
            EntryAction::LockAll => self.canvas.lock_all(),
            EntryAction::InsertText => {
                let (x, y) = self.config.text_position;
                let mut text = Text::new(Point::new(x, y), self.config.text_content.clone());
                text.style = self.controller.text_style();
                self.canvas.add_shape(Shape::Text(text));
            }
        }
    }

    /// Re-apply the active tool's lock policy after the object set was replaced.
    fn reapply_locks(&mut self) {
        for action in self.mode().spec().entry {
            match action {
                EntryAction::UnlockAll => self.canvas.unlock_all(),
                EntryAction::LockAll => self.canvas.lock_all(),
                EntryAction::InsertText => {}
            }
        }
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.controller.set_color(color, &mut self.tools);
    }

    /// Set the stroke width, clamped to 1..=20. Returns the applied width.
    pub fn set_width(&mut self, width: u32) -> u32 {
        self.controller.set_width(width, &mut self.tools)
    }

    pub fn set_fill(&mut self, fill: bool) {
        self.controller.set_fill(fill);
    }

    /// Deliver a pointer event to the active tool.
    ///
    /// Events for unbound callbacks are dropped. Returns true when the document changed.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        if !self.tools.accepts(event.kind()) {
            return false;
        }
        let changed = match event {
            PointerEvent::Down {
                position,
                modifiers,
            } => self.on_press(position, modifiers),
            PointerEvent::Move { position } => self.on_move(position),
            PointerEvent::Up { position } => self.on_release(position),
        };
        if changed && self.live_shapes().is_empty() {
            self.touch();
        }
        changed
    }

    /// Objects being reshaped or dragged by the gesture in progress.
    pub fn live_shapes(&self) -> Vec<ShapeId> {
        match self.tools.state {
            ToolState::Drawing { shape_id, .. } => vec![shape_id],
            ToolState::Moving { .. } => self.canvas.selection.clone(),
            ToolState::Idle | ToolState::Stroking | ToolState::Marquee { .. } => Vec::new(),
        }
    }

    fn on_press(&mut self, point: Point, modifiers: crate::input::Modifiers) -> bool {
        let tool = self.mode();
        if tool == ToolKind::Select {
            let before = self.canvas.selection.clone();
            selection::press(&mut self.canvas, &mut self.tools, point, modifiers);
            return before != self.canvas.selection;
        }
        if tool.is_shape_tool() {
            let style = self.controller.style();
            if let Some(shape) = self.tools.begin_shape(point, &style) {
                self.canvas.add_shape(shape);
                return true;
            }
            return false;
        }
        self.tools.begin_stroke(point)
    }

    fn on_move(&mut self, point: Point) -> bool {
        match self.tools.state {
            ToolState::Drawing { origin, shape_id } => self.resize_drawn(shape_id, origin, point),
            // The brush and the marquee are previews; the document is untouched.
            ToolState::Stroking => {
                self.tools.extend_stroke(point);
                false
            }
            ToolState::Marquee { .. } => {
                selection::drag(&mut self.canvas, &mut self.tools, point);
                false
            }
            ToolState::Moving { .. } => {
                selection::drag(&mut self.canvas, &mut self.tools, point)
            }
            ToolState::Idle => false,
        }
    }

    fn on_release(&mut self, point: Point) -> bool {
        match self.tools.state {
            ToolState::Drawing { origin, shape_id } => {
                self.resize_drawn(shape_id, origin, point);
                self.tools.end();
                true
            }
            ToolState::Stroking => {
                self.tools.extend_stroke(point);
                match self.tools.end_stroke() {
                    Some(Stroke::Path(shape)) => {
                        self.canvas.add_shape(shape);
                    }
                    Some(Stroke::Erase(stroke)) => {
                        let hit = self.canvas.document.erase(&stroke);
                        log::debug!("Eraser touched {} object(s)", hit.len());
                    }
                    None => {}
                }
                true
            }
            ToolState::Moving { .. } | ToolState::Marquee { .. } => {
                selection::release(&mut self.canvas, &mut self.tools, point);
                true
            }
            ToolState::Idle => false,
        }
    }

    fn resize_drawn(&mut self, id: ShapeId, origin: Point, point: Point) -> bool {
        match self.canvas.document.get_shape_mut(id) {
            Some(shape) => {
                drag_shape(shape, origin, point);
                true
            }
            None => false,
        }
    }

    /// Brush stroke in progress, for live preview.
    pub fn stroke_preview(&self) -> Option<&[Point]> {
        self.tools
            .brush()
            .filter(|b| b.is_stroking())
            .map(|b| b.points())
    }

    /// Marquee being dragged by the select tool.
    pub fn marquee(&self) -> Option<kurbo::Rect> {
        selection::marquee(&self.tools)
    }

    /// Serialize the document.
    pub fn serialize(&self) -> Result<serde_json::Value, DocumentError> {
        self.canvas.serialize()
    }

    /// Replace the document. On error the board is unchanged.
    pub fn deserialize(&mut self, value: serde_json::Value) -> Result<(), DocumentError> {
        let result = self.canvas.deserialize(value);
        self.after_load(result)
    }

    /// Replace the document from JSON text. On error the board is unchanged.
    pub fn deserialize_str(&mut self, json: &str) -> Result<(), DocumentError> {
        let result = self.canvas.deserialize_str(json);
        self.after_load(result)
    }

    /// Replace the document with an imported fabric.js canvas.
    pub fn import_fabric(&mut self, value: &serde_json::Value) -> Result<(), DocumentError> {
        let result = crate::fabric::import_fabric(value).map(|doc| self.canvas.load_document(doc));
        self.after_load(result)
    }

    fn after_load(&mut self, result: Result<(), DocumentError>) -> Result<(), DocumentError> {
        match result {
            Ok(()) => {
                self.tools.cancel();
                self.reapply_locks();
                self.touch();
                log::info!("Loaded document with {} object(s)", self.canvas.document.len());
                Ok(())
            }
            Err(e) => {
                log::warn!("Document rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Add an image at its natural size at the canvas origin.
    pub fn upload_image(&mut self, bytes: &[u8]) -> Result<ShapeId, ImageError> {
        let image = Image::from_bytes(Point::ZERO, bytes)?;
        log::info!(
            "Added {}x{} {:?} image",
            image.source_width,
            image.source_height,
            image.format
        );
        let id = self.canvas.add_shape(Shape::Image(image));
        self.reapply_locks();
        self.touch();
        Ok(id)
    }

    /// Replace the background image, scaled to cover the canvas.
    pub fn set_background_image(&mut self, bytes: &[u8]) -> Result<(), ImageError> {
        let image = Image::from_bytes(Point::ZERO, bytes)?.cover(
            self.config.canvas_width as f64,
            self.config.canvas_height as f64,
        );
        self.canvas.document.background_image = Some(image);
        self.touch();
        Ok(())
    }

    /// Remove every object, keeping the background image.
    pub fn clear(&mut self) {
        self.tools.cancel();
        self.canvas.clear();
        self.touch();
    }

    /// The selected object when exactly one text object is selected.
    pub fn selected_text(&self) -> Option<(ShapeId, &str)> {
        match self.canvas.selection.as_slice() {
            [id] => match self.canvas.document.get_shape(*id)? {
                Shape::Text(text) => Some((*id, text.content.as_str())),
                _ => None,
            },
            _ => None,
        }
    }

    /// Replace the content of a text object. Returns false if `id` is not text.
    pub fn set_text(&mut self, id: ShapeId, content: &str) -> bool {
        let Some(text) = self
            .canvas
            .document
            .get_shape_mut(id)
            .and_then(Shape::as_text_mut)
        else {
            return false;
        };
        if text.content != content {
            text.content = content.to_string();
            self.touch();
        }
        true
    }

    /// Delete the selected objects.
    pub fn delete_selected(&mut self) -> usize {
        let removed = self.canvas.delete_selected();
        if removed > 0 {
            self.touch();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_in_select_mode() {
        let board = Whiteboard::default();
        assert_eq!(board.mode(), ToolKind::Select);
        assert!(board.canvas().multi_select());
        assert_eq!(board.revision(), 0);
    }

    #[test]
    fn test_text_tool_inserts_text() {
        let mut board = Whiteboard::default();
        board.select_tool(ToolKind::Text);
        board.select_tool(ToolKind::Text);

        let doc = &board.canvas().document;
        assert_eq!(doc.type_tags(), vec!["text", "text"]);
        let Shape::Text(text) = &doc.objects[0] else { panic!() };
        assert_eq!(text.position, Point::new(100.0, 100.0));
        assert_eq!(text.content, "text");
        assert_eq!(text.style.fill_color, Some(SerializableColor::black()));
    }

    #[test]
    fn test_text_ignores_pointer() {
        let mut board = Whiteboard::default();
        board.select_tool(ToolKind::Text);
        assert!(!board.handle_pointer(PointerEvent::down(5.0, 5.0)));
        assert_eq!(board.canvas().document.len(), 1);
    }

    #[test]
    fn test_set_text() {
        let mut board = Whiteboard::default();
        board.select_tool(ToolKind::Text);
        let id = board.canvas().document.objects[0].id();
        board.select_tool(ToolKind::Select);

        board.handle_pointer(PointerEvent::down(105.0, 105.0));
        board.handle_pointer(PointerEvent::up(105.0, 105.0));
        assert_eq!(board.selected_text(), Some((id, "text")));

        assert!(board.set_text(id, "hello"));
        assert_eq!(board.selected_text(), Some((id, "hello")));
    }

    #[test]
    fn test_revision_waits_for_shape_release() {
        let mut board = Whiteboard::default();
        board.select_tool(ToolKind::Line);
        let start = board.revision();
        assert!(board.handle_pointer(PointerEvent::down(0.0, 0.0)));
        let id = board.canvas().document.objects[0].id();
        assert_eq!(board.live_shapes(), vec![id]);

        for x in 1..20 {
            assert!(board.handle_pointer(PointerEvent::moved(x as f64, 0.0)));
        }
        assert_eq!(board.revision(), start);

        board.handle_pointer(PointerEvent::up(20.0, 0.0));
        assert!(board.live_shapes().is_empty());
        assert_eq!(board.revision(), start + 1);
    }

    #[test]
    fn test_stroke_moves_leave_revision() {
        let mut board = Whiteboard::default();
        board.select_tool(ToolKind::Pencil);
        board.handle_pointer(PointerEvent::down(0.0, 0.0));
        let during = board.revision();
        for x in 1..50 {
            assert!(!board.handle_pointer(PointerEvent::moved(x as f64, x as f64)));
        }
        assert_eq!(board.revision(), during);
        assert!(board.canvas().document.is_empty());
        assert_eq!(board.stroke_preview().map(<[Point]>::len), Some(50));

        board.handle_pointer(PointerEvent::up(50.0, 50.0));
        assert_eq!(board.revision(), during + 1);
        assert_eq!(board.canvas().document.type_tags(), vec!["path"]);
    }

    #[test]
    fn test_moving_selection_is_live() {
        let mut board = Whiteboard::default();
        board.select_tool(ToolKind::Rectangle);
        board.handle_pointer(PointerEvent::down(10.0, 10.0));
        board.handle_pointer(PointerEvent::up(50.0, 50.0));
        board.select_tool(ToolKind::Select);
        let id = board.canvas().document.objects[0].id();
        let start = board.revision();

        board.handle_pointer(PointerEvent::down(10.0, 30.0));
        assert_eq!(board.live_shapes(), vec![id]);
        board.handle_pointer(PointerEvent::moved(20.0, 30.0));
        assert_eq!(board.revision(), start);

        board.handle_pointer(PointerEvent::up(20.0, 30.0));
        assert!(board.live_shapes().is_empty());
        assert!(board.revision() > start);
    }
}
