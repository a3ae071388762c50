#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod constants;
mod data;
mod error;
mod net;
mod scale;
mod state;
mod ui;

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::AppConfig::load();

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "InsightOxide - 서비스 인사이트",
        options,
        Box::new(|_| Ok(Box::new(app::InsightOxide::new(config)))),
    )
    .unwrap();
}
