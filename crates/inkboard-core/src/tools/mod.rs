//! Tool system for the whiteboard.
//!
//! Every tool is described by a static [`ToolSpec`]: which pointer callbacks it
//! binds, which brush it installs and what it does on entry. [`ToolManager`]
//! holds the bindings of the active tool and the state of the gesture in progress.

mod brush;

pub use brush::{BrushKind, FreehandBrush, Stroke};

use crate::input::PointerEventKind;
use crate::shapes::{Ellipse, Line, Rectangle, Shape, ShapeId, ShapeStyle, Triangle};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Rectangle,
    Ellipse,
    Triangle,
    Line,
    Pencil,
    Eraser,
    Text,
}

/// Which of the three pointer callbacks are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointerBindings {
    pub press: bool,
    pub moves: bool,
    pub release: bool,
}

impl PointerBindings {
    pub const NONE: Self = Self {
        press: false,
        moves: false,
        release: false,
    };

    pub const ALL: Self = Self {
        press: true,
        moves: true,
        release: true,
    };

    /// Whether events of this kind reach the tool.
    pub fn accepts(&self, kind: PointerEventKind) -> bool {
        match kind {
            PointerEventKind::Down => self.press,
            PointerEventKind::Move => self.moves,
            PointerEventKind::Up => self.release,
        }
    }
}

/// Side effects run when a tool becomes active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    /// Make every object selectable and enable multi-selection.
    UnlockAll,
    /// Make every existing object non-selectable.
    LockAll,
    /// Insert a default text object.
    InsertText,
}

/// Static description of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub bindings: PointerBindings,
    pub brush: Option<BrushKind>,
    pub entry: &'static [EntryAction],
}

impl ToolKind {
    /// All tools in toolbar order.
    pub const ALL: [ToolKind; 8] = [
        ToolKind::Select,
        ToolKind::Rectangle,
        ToolKind::Ellipse,
        ToolKind::Triangle,
        ToolKind::Line,
        ToolKind::Pencil,
        ToolKind::Eraser,
        ToolKind::Text,
    ];

    /// Transition table entry for this tool.
    pub fn spec(self) -> ToolSpec {
        use EntryAction::*;
        match self {
            ToolKind::Select => ToolSpec {
                bindings: PointerBindings::ALL,
                brush: None,
                entry: &[UnlockAll],
            },
            ToolKind::Rectangle | ToolKind::Ellipse | ToolKind::Triangle | ToolKind::Line => {
                ToolSpec {
                    bindings: PointerBindings::ALL,
                    brush: None,
                    entry: &[LockAll],
                }
            }
            ToolKind::Pencil => ToolSpec {
                bindings: PointerBindings::ALL,
                brush: Some(BrushKind::Pencil),
                entry: &[LockAll],
            },
            ToolKind::Eraser => ToolSpec {
                bindings: PointerBindings::ALL,
                brush: Some(BrushKind::Eraser),
                entry: &[LockAll],
            },
            ToolKind::Text => ToolSpec {
                bindings: PointerBindings::NONE,
                brush: None,
                entry: &[LockAll, InsertText],
            },
        }
    }

    /// Whether a press-drag-release gesture creates a shape.
    pub fn is_shape_tool(self) -> bool {
        matches!(
            self,
            ToolKind::Rectangle | ToolKind::Ellipse | ToolKind::Triangle | ToolKind::Line
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Ellipse => "Ellipse",
            ToolKind::Triangle => "Triangle",
            ToolKind::Line => "Line",
            ToolKind::Pencil => "Pencil",
            ToolKind::Eraser => "Eraser",
            ToolKind::Text => "Text",
        }
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// A shape tool is sizing a shape between `origin` and the pointer.
    Drawing { origin: Point, shape_id: ShapeId },
    /// A brush stroke is in progress.
    Stroking,
    /// The select tool is dragging the selection.
    Moving { last: Point },
    /// The select tool is dragging a marquee.
    Marquee { origin: Point, current: Point },
}

/// Manages the current tool and its state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    bindings: PointerBindings,
    brush: Option<FreehandBrush>,
}

impl ToolManager {
    /// Create a new tool manager with nothing bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every binding, the brush and any gesture in progress.
    /// Returns the triplet that was unbound.
    pub fn unbind(&mut self) -> PointerBindings {
        self.cancel();
        self.bindings = PointerBindings::NONE;
        self.brush = None;
        PointerBindings::ALL
    }

    /// Bind a tool's callbacks and install its brush. Returns the bindings.
    pub fn bind(&mut self, tool: ToolKind, style: &ShapeStyle) -> PointerBindings {
        let spec = tool.spec();
        self.current_tool = tool;
        self.state = ToolState::Idle;
        self.bindings = spec.bindings;
        self.brush = spec
            .brush
            .map(|kind| FreehandBrush::new(kind, style.stroke_color, style.stroke_width));
        self.bindings
    }

    /// Currently bound callbacks.
    pub fn bindings(&self) -> PointerBindings {
        self.bindings
    }

    pub fn accepts(&self, kind: PointerEventKind) -> bool {
        self.bindings.accepts(kind)
    }

    pub fn brush(&self) -> Option<&FreehandBrush> {
        self.brush.as_ref()
    }

    pub fn brush_mut(&mut self) -> Option<&mut FreehandBrush> {
        self.brush.as_mut()
    }

    /// Check if a tool interaction is active.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, ToolState::Idle)
    }

    /// Start sizing a new shape at `origin`.
    ///
    /// Returns the zero-size shape to add to the canvas, or `None` when the
    /// current tool does not draw shapes.
    pub fn begin_shape(&mut self, origin: Point, style: &ShapeStyle) -> Option<Shape> {
        let mut shape = match self.current_tool {
            ToolKind::Rectangle => Shape::Rectangle(Rectangle::new(origin, 0.0, 0.0)),
            ToolKind::Ellipse => Shape::Ellipse(Ellipse::new(origin, 0.0, 0.0)),
            ToolKind::Triangle => Shape::Triangle(Triangle::new(origin, 0.0, 0.0)),
            ToolKind::Line => Shape::Line(Line::new(origin, origin)),
            _ => return None,
        };
        *shape.style_mut() = style.clone();
        self.state = ToolState::Drawing {
            origin,
            shape_id: shape.id(),
        };
        Some(shape)
    }

    /// Start a brush stroke. Returns false when no brush is installed.
    pub fn begin_stroke(&mut self, point: Point) -> bool {
        let Some(brush) = self.brush.as_mut() else {
            return false;
        };
        brush.begin(point);
        self.state = ToolState::Stroking;
        true
    }

    /// Extend the brush stroke in progress.
    pub fn extend_stroke(&mut self, point: Point) {
        if self.state != ToolState::Stroking {
            return;
        }
        if let Some(brush) = self.brush.as_mut() {
            brush.extend(point);
        }
    }

    /// Finish the brush stroke in progress.
    pub fn end_stroke(&mut self) -> Option<Stroke> {
        if self.state != ToolState::Stroking {
            return None;
        }
        self.state = ToolState::Idle;
        self.brush.as_mut().and_then(FreehandBrush::finish)
    }

    /// End the current interaction and return the state it was in.
    pub fn end(&mut self) -> ToolState {
        std::mem::take(&mut self.state)
    }

    /// Cancel the current interaction.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
        if let Some(brush) = self.brush.as_mut() {
            brush.cancel();
        }
    }
}

/// Resize a shape being drawn so it spans `origin` to `point`.
///
/// Box shapes use the normalized rectangle; lines move their second endpoint.
pub fn drag_shape(shape: &mut Shape, origin: Point, point: Point) {
    match shape {
        Shape::Rectangle(rect) => rect.set_corners(origin, point),
        Shape::Ellipse(ellipse) => ellipse.set_rect(Rect::from_points(origin, point)),
        Shape::Triangle(triangle) => triangle.set_corners(origin, point),
        Shape::Line(line) => {
            line.start = origin;
            line.end = point;
        }
        Shape::Freehand(_) | Shape::Text(_) | Shape::Image(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        for tool in ToolKind::ALL {
            let spec = tool.spec();
            if tool == ToolKind::Text {
                assert_eq!(spec.bindings, PointerBindings::NONE);
                assert!(spec.entry.contains(&EntryAction::InsertText));
            } else {
                assert_eq!(spec.bindings, PointerBindings::ALL);
            }
        }
        assert_eq!(ToolKind::Select.spec().entry, &[EntryAction::UnlockAll]);
        assert_eq!(ToolKind::Pencil.spec().brush, Some(BrushKind::Pencil));
        assert_eq!(ToolKind::Eraser.spec().brush, Some(BrushKind::Eraser));
        assert_eq!(ToolKind::Line.spec().brush, None);
    }

    #[test]
    fn test_bind_and_unbind() {
        let mut tm = ToolManager::new();
        assert_eq!(tm.bindings(), PointerBindings::NONE);

        tm.bind(ToolKind::Pencil, &ShapeStyle::default());
        assert!(tm.accepts(PointerEventKind::Move));
        assert!(tm.brush().is_some());

        assert_eq!(tm.unbind(), PointerBindings::ALL);
        assert!(!tm.accepts(PointerEventKind::Down));
        assert!(tm.brush().is_none());
    }

    #[test]
    fn test_shape_interaction() {
        let mut tm = ToolManager::new();
        tm.bind(ToolKind::Rectangle, &ShapeStyle::default());

        let mut shape = tm.begin_shape(Point::new(10.0, 10.0), &ShapeStyle::default()).unwrap();
        assert!(tm.is_active());
        let ToolState::Drawing { origin, shape_id } = tm.state else {
            panic!("expected drawing state");
        };
        assert_eq!(shape_id, shape.id());

        drag_shape(&mut shape, origin, Point::new(0.0, 30.0));
        assert_eq!(shape.bounds(), Rect::new(0.0, 10.0, 10.0, 30.0));

        tm.end();
        assert!(!tm.is_active());
    }

    #[test]
    fn test_begin_shape_ignored_for_non_shape_tools() {
        let mut tm = ToolManager::new();
        tm.bind(ToolKind::Select, &ShapeStyle::default());
        assert!(tm.begin_shape(Point::ZERO, &ShapeStyle::default()).is_none());
        assert!(!tm.is_active());
    }

    #[test]
    fn test_cancel_drops_stroke() {
        let mut tm = ToolManager::new();
        tm.bind(ToolKind::Eraser, &ShapeStyle::default());
        assert!(tm.begin_stroke(Point::ZERO));
        tm.extend_stroke(Point::new(3.0, 3.0));
        tm.cancel();
        assert!(tm.end_stroke().is_none());
        assert!(!tm.brush().unwrap().is_stroking());
    }
}
