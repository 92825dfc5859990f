#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod context;
mod helpers;
mod modules;
mod theme;

use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    helpers::log::init()?;

    // Optional: a data folder to open straight away.
    let folder = std::env::args_os().nth(1).map(PathBuf::from);
    tracing::info!(
        "[app] seismark {} starting, log at {}",
        env!("CARGO_PKG_VERSION"),
        helpers::log::log_file_path().display()
    );

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title("SeisMark")
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SeisMark",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::SeisMarkApp::new(cc, folder)))),
    )
    .map_err(|e| anyhow::anyhow!("event loop failed: {e}"))
}
