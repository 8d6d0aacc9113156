mod app;
mod config;
mod designer;
mod drop_zone;
mod export;
mod fit;
mod logo;
mod overlay;
mod ui_theme;

use config::DesignerConfig;
use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let config = DesignerConfig::load_or_init(&DesignerConfig::default_path());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([620.0, 560.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "T-Shirt Designer",
        options,
        Box::new(|cc| Ok(Box::new(app::DesignerApp::new(cc, config)))),
    )
}
