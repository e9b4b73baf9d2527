//! Main application entry point.

fn main() -> eframe::Result {
    env_logger::init();
    log::info!("Starting Inkboard");

    let config = inkboard_core::WhiteboardConfig::load();
    inkboard_app::run(config)
}
