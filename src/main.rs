use anyhow::{Context, Result};
use speed_edit::app::SpeedEditApp;
use speed_edit::config::AppConfig;
use speed_edit::upload::EnhanceOptions;
use speed_edit::workflow::WorkflowController;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("speed_edit=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        base_url = %config.base_url,
        checkout = ?config.checkout_mode,
        "configuration loaded"
    );

    let controller = WorkflowController::new(&config, EnhanceOptions::default())?;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([600.0, 640.0])
            .with_min_inner_size([420.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Speed Edit",
        options,
        Box::new(move |cc: &eframe::CreationContext<'_>| -> Box<dyn eframe::App> {
            Box::new(SpeedEditApp::new(cc, controller))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run the window: {}", e))
}
