//! Native file dialogs.

use inkboard_core::shapes::ImageFormat;
use std::path::PathBuf;

/// Save document JSON using a native file dialog.
pub fn save_document(json: &str) {
    let dialog = rfd::FileDialog::new()
        .set_title("Save Document")
        .set_file_name("whiteboard.json")
        .add_filter("Inkboard Document", &["json"]);

    if let Some(path) = dialog.save_file() {
        if let Err(e) = std::fs::write(&path, json) {
            log::error!("Failed to write file: {}", e);
        } else {
            log::info!("Saved document to: {:?}", path);
        }
    }
}

/// Pick a JSON file and return its contents.
pub fn open_json(title: &str) -> Option<String> {
    let path = rfd::FileDialog::new()
        .set_title(title)
        .add_filter("JSON", &["json"])
        .pick_file()?;
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            log::info!("Read {:?}", path);
            Some(content)
        }
        Err(e) => {
            log::error!("Failed to read file: {}", e);
            None
        }
    }
}

/// Pick an image file and return its bytes.
pub fn open_image(title: &str) -> Option<Vec<u8>> {
    let path = rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Images", ImageFormat::extensions())
        .pick_file()?;
    match std::fs::read(&path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::error!("Failed to read image: {}", e);
            None
        }
    }
}

/// Directory the PNG export dialog opens in.
fn export_directory() -> Option<PathBuf> {
    dirs::download_dir().or_else(dirs::home_dir)
}

/// Export PNG to file using a native file dialog.
pub fn export_png(png_data: &[u8]) {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Export PNG")
        .set_file_name("whiteboard.png")
        .add_filter("PNG Image", &["png"]);
    if let Some(dir) = export_directory() {
        dialog = dialog.set_directory(dir);
    }

    if let Some(path) = dialog.save_file() {
        if let Err(e) = std::fs::write(&path, png_data) {
            log::error!("Failed to write PNG: {}", e);
        } else {
            log::info!("Exported PNG to: {:?}", path);
        }
    }
}
