//! Absence Dashboard - Employee absence reporting for a health surveillance team
//!
//! Reads the absence form's shared spreadsheet, lets the user filter it by
//! employee, sector, reason and period, and shows metrics, stacked histograms
//! and a detail table that can be exported as CSV or XLSX.

mod charts;
mod config;
mod data;
mod export;
mod filter;
mod gui;
mod stats;

use config::DashboardConfig;
use eframe::egui;
use gui::DashboardApp;
use tracing::info;
use tracing_subscriber::EnvFilter;

const APP_TITLE: &str = "Dashboard de Faltas - Vigilância em Saúde";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("absence_dashboard=info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting absence dashboard");

    let config = DashboardConfig::load()?;

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1100.0, 650.0])
            .with_title(APP_TITLE),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
