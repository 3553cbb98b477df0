mod app;
mod ui;

use std::path::Path;

use app::RustyChartsApp;
use eframe::egui;
use rusty_charts::config::EngineConfig;

/// Optional JSON file overriding [`EngineConfig`] defaults.
const CONFIG_ENV: &str = "RUSTY_CHARTS_CONFIG";

fn load_config() -> EngineConfig {
    let Some(path) = std::env::var_os(CONFIG_ENV) else {
        return EngineConfig::default();
    };
    match EngineConfig::from_json_file(Path::new(&path)) {
        Ok(config) => {
            log::info!("using config from {}", Path::new(&path).display());
            config
        }
        Err(e) => {
            log::error!("ignoring {CONFIG_ENV}: {e:#}");
            EngineConfig::default()
        }
    }
}

fn main() -> eframe::Result {
    env_logger::init();
    let config = load_config();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Charts – Data Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyChartsApp::new(config)))),
    )
}
