//! Main application state and event loop.

use crate::canvas_view::CanvasView;
use crate::file_ops;
use crate::ui::{ToolbarState, UiAction, from_color32, render_toolbar};
use inkboard_core::{ShapeId, Whiteboard, WhiteboardConfig};
use inkboard_render::export_png;

/// Main application struct.
pub struct App {
    board: Whiteboard,
    view: CanvasView,
    /// Text object being edited and its working copy.
    text_edit: Option<(ShapeId, String)>,
}

impl App {
    /// Create a new application around an empty board.
    pub fn new(config: WhiteboardConfig) -> Self {
        Self {
            board: Whiteboard::new(config),
            view: CanvasView::new(),
            text_edit: None,
        }
    }

    fn toolbar_state(&mut self) -> ToolbarState {
        // Keep the working copy while the same text object stays selected
        let selected = self.board.selected_text().map(|(id, content)| (id, content.to_string()));
        self.text_edit = match (self.text_edit.take(), selected) {
            (Some((edit_id, buffer)), Some((id, _))) if edit_id == id => Some((id, buffer)),
            (_, selected) => selected,
        };

        let controller = self.board.controller();
        let color = controller.color();
        ToolbarState {
            tool: controller.mode(),
            color: [color.r, color.g, color.b],
            width: controller.width(),
            fill: controller.fill(),
            text: self.text_edit.clone(),
        }
    }

    fn handle_ui_action(&mut self, action: UiAction) {
        match action {
            UiAction::SetTool(tool) => {
                self.board.select_tool(tool);
            }
            UiAction::SetColor(color) => self.board.set_color(from_color32(color)),
            UiAction::SetWidth(width) => {
                self.board.set_width(width);
            }
            UiAction::SetFill(fill) => self.board.set_fill(fill),
            UiAction::Clear => {
                self.board.clear();
                log::info!("Board cleared");
            }
            UiAction::ExportPng => {
                let config = self.board.config();
                match export_png(
                    &self.board.canvas().document,
                    config.canvas_width,
                    config.canvas_height,
                ) {
                    Ok(png_data) => file_ops::export_png(&png_data),
                    Err(e) => log::error!("Failed to export PNG: {}", e),
                }
            }
            UiAction::SaveDocument => match self.board.serialize() {
                Ok(value) => match serde_json::to_string_pretty(&value) {
                    Ok(json) => file_ops::save_document(&json),
                    Err(e) => log::error!("Failed to serialize document: {}", e),
                },
                Err(e) => log::error!("Failed to serialize document: {}", e),
            },
            UiAction::LoadDocument => {
                if let Some(json) = file_ops::open_json("Open Document") {
                    if let Err(e) = self.board.deserialize_str(&json) {
                        log::error!("Failed to load document: {}", e);
                    }
                }
            }
            UiAction::ImportFabric => {
                let Some(json) = file_ops::open_json("Import fabric.js JSON") else {
                    return;
                };
                let result = serde_json::from_str::<serde_json::Value>(&json)
                    .map_err(inkboard_core::DocumentError::Parse)
                    .and_then(|value| self.board.import_fabric(&value));
                if let Err(e) = result {
                    log::error!("Failed to import fabric.js JSON: {}", e);
                }
            }
            UiAction::UploadImage => {
                if let Some(bytes) = file_ops::open_image("Upload Image") {
                    if let Err(e) = self.board.upload_image(&bytes) {
                        log::error!("Failed to add image: {}", e);
                    }
                }
            }
            UiAction::SetBackground => {
                if let Some(bytes) = file_ops::open_image("Set Background Image") {
                    if let Err(e) = self.board.set_background_image(&bytes) {
                        log::error!("Failed to set background: {}", e);
                    }
                }
            }
            UiAction::DeleteSelected => {
                let removed = self.board.delete_selected();
                log::debug!("Deleted {} object(s)", removed);
            }
            UiAction::SetText(id, content) => {
                self.board.set_text(id, &content);
                self.text_edit = Some((id, content));
            }
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut toolbar = self.toolbar_state();
        let mut action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| render_toolbar(ui, &mut toolbar))
            .inner;

        let delete_pressed = !ctx.wants_keyboard_input()
            && ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace));
        if action.is_none() && delete_pressed {
            action = Some(UiAction::DeleteSelected);
        }
        if let Some(action) = action {
            self.handle_ui_action(action);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                self.view.show(ui, &mut self.board);
            });
        });
    }
}

/// Open the native window and run the event loop.
pub fn run(config: WhiteboardConfig) -> eframe::Result {
    let size = [
        config.canvas_width as f32 + 32.0,
        config.canvas_height as f32 + 120.0,
    ];
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Inkboard")
            .with_inner_size(size)
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Inkboard",
        options,
        Box::new(|_cc| Ok(Box::new(App::new(config)))),
    )
}
