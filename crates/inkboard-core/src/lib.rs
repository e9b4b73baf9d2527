//! Inkboard Core Library
//!
//! Platform-agnostic core data structures and logic for the Inkboard whiteboard:
//! the canvas document, the drawing tools and the mode controller that switches
//! between them.

pub mod canvas;
pub mod config;
pub mod controller;
pub mod fabric;
pub mod input;
pub mod selection;
pub mod shapes;
pub mod tools;
pub mod whiteboard;

pub use canvas::{Canvas, CanvasDocument, DocumentError, EraserStroke};
pub use config::{ConfigError, WhiteboardConfig};
pub use controller::{ModeController, Transition, WIDTH_RANGE};
pub use input::{Modifiers, PointerEvent, PointerEventKind};
pub use shapes::{ImageError, SerializableColor, Shape, ShapeId, ShapeStyle, ShapeTrait};
pub use tools::{BrushKind, FreehandBrush, PointerBindings, ToolKind, ToolManager, ToolState};
pub use whiteboard::Whiteboard;
