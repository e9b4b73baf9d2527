//! Pointer input events delivered to the whiteboard.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys held on press. Shift extends the selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
}

/// The three pointer callbacks a tool can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
}

/// Pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, modifiers: Modifiers },
    Move { position: Point },
    Up { position: Point },
}

impl PointerEvent {
    /// Primary-button press without modifiers.
    pub fn down(x: f64, y: f64) -> Self {
        PointerEvent::Down {
            position: Point::new(x, y),
            modifiers: Modifiers::default(),
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        PointerEvent::Move {
            position: Point::new(x, y),
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        PointerEvent::Up {
            position: Point::new(x, y),
        }
    }

    pub fn kind(&self) -> PointerEventKind {
        match self {
            PointerEvent::Down { .. } => PointerEventKind::Down,
            PointerEvent::Move { .. } => PointerEventKind::Move,
            PointerEvent::Up { .. } => PointerEventKind::Up,
        }
    }

    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => *position,
        }
    }
}
