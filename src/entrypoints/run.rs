use super::{APP_NAME, logging, metadata::log_version_info};
use crate::app::{NavApp, settings::Settings};

/// Native (desktop) entry point, called from `main.rs`
pub fn run_native() {
    logging::setup_logging();
    log_version_info();

    let settings = Settings::from_cli();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create Tokio runtime: {e}");
            return;
        }
    };
    // Keep the runtime entered on the UI thread so routing requests can be spawned
    let _guard = rt.enter();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([360.0, 480.0])
            .with_title(APP_NAME),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(move |cc| Ok(Box::new(NavApp::new(settings, cc)))),
    ) {
        tracing::error!("{APP_NAME} exited with an error: {e}");
    }
}
