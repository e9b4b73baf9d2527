//! Toolbar UI using egui.

use egui::{Color32, Ui};
use inkboard_core::{SerializableColor, ShapeId, ToolKind, WIDTH_RANGE};

/// Actions that can be triggered from the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// Change the current tool.
    SetTool(ToolKind),
    /// Change drawing color.
    SetColor(Color32),
    /// Change stroke width.
    SetWidth(u32),
    /// Toggle filling of new shapes.
    SetFill(bool),
    /// Remove every object except the background image.
    Clear,
    /// Export the board as a PNG file.
    ExportPng,
    /// Save the document as JSON.
    SaveDocument,
    /// Load a JSON document.
    LoadDocument,
    /// Import a fabric.js canvas JSON file.
    ImportFabric,
    /// Insert an image file.
    UploadImage,
    /// Replace the background image.
    SetBackground,
    /// Delete the selected objects.
    DeleteSelected,
    /// Replace the content of a text object.
    SetText(ShapeId, String),
}

/// Toolbar widget state, refreshed from the whiteboard every frame.
#[derive(Debug, Clone)]
pub struct ToolbarState {
    pub tool: ToolKind,
    pub color: [u8; 3],
    pub width: u32,
    pub fill: bool,
    /// Text object being edited and its working copy.
    pub text: Option<(ShapeId, String)>,
}

pub fn to_color32(color: SerializableColor) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

pub fn from_color32(color: Color32) -> SerializableColor {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    SerializableColor::new(r, g, b, a)
}

/// Render the toolbar and return any triggered action.
pub fn render_toolbar(ui: &mut Ui, state: &mut ToolbarState) -> Option<UiAction> {
    let mut action = None;

    ui.horizontal_wrapped(|ui| {
        for tool in ToolKind::ALL {
            if ui
                .selectable_label(state.tool == tool, tool.label())
                .clicked()
            {
                action = Some(UiAction::SetTool(tool));
            }
        }

        ui.separator();

        if ui.color_edit_button_srgb(&mut state.color).changed() {
            let [r, g, b] = state.color;
            action = Some(UiAction::SetColor(Color32::from_rgb(r, g, b)));
        }
        if ui
            .add(egui::Slider::new(&mut state.width, WIDTH_RANGE).text("Width"))
            .changed()
        {
            action = Some(UiAction::SetWidth(state.width));
        }
        if ui.checkbox(&mut state.fill, "Fill").changed() {
            action = Some(UiAction::SetFill(state.fill));
        }
    });

    ui.horizontal_wrapped(|ui| {
        let buttons = [
            ("Clear", UiAction::Clear),
            ("Export PNG", UiAction::ExportPng),
            ("Save JSON", UiAction::SaveDocument),
            ("Load JSON", UiAction::LoadDocument),
            ("Import fabric JSON", UiAction::ImportFabric),
            ("Upload image", UiAction::UploadImage),
            ("Set background", UiAction::SetBackground),
        ];
        for (label, button_action) in buttons {
            if ui.button(label).clicked() {
                action = Some(button_action);
            }
        }

        if let Some((id, content)) = state.text.as_mut() {
            ui.separator();
            ui.label("Text:");
            if ui.text_edit_singleline(content).changed() {
                action = Some(UiAction::SetText(*id, content.clone()));
            }
        }
    });

    action
}
