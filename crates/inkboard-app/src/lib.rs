//! Inkboard Application
//!
//! The desktop shell: a toolbar, the canvas view and native file dialogs around
//! a single [`inkboard_core::Whiteboard`].

mod app;
mod canvas_view;
mod file_ops;
mod ui;

pub use app::{App, run};
pub use canvas_view::CanvasView;
pub use ui::{ToolbarState, UiAction, render_toolbar};
