use eframe::egui;
use repaso::gui::RepasoApp;

fn main() -> eframe::Result {
    tracing_subscriber::fmt().with_target(false).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 840.0])
            .with_min_inner_size([980.0, 640.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native("Repaso", options, Box::new(|cc| Ok(Box::new(RepasoApp::new(cc)))))
}
