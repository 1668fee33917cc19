mod analysis;
mod config;
mod editor;
mod files;
mod logo;
mod session;
mod speech;
mod states;
mod task;
mod ui;

use anyhow::Result;
use clap::Parser;
use config::Config;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(config.log_json);

    let client = analysis::HttpAnalysisClient::new(&config)?;
    info!(endpoint = client.endpoint(), "analysis service configured");
    let speech = speech::SystemSpeech::new(config.speech_command()?);
    let session = session::AnalysisSession::new(Box::new(client), Box::new(speech));

    let mut viewport = egui::ViewportBuilder::default()
        .with_title("PySleuth")
        .with_inner_size([1200.0, 760.0])
        .with_min_inner_size([720.0, 480.0]);
    if let Some(icon) = logo::icon_data_from_svg(logo::LOGO_SVG) {
        viewport = viewport.with_icon(icon);
    }
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let api_url = config.api_url.clone();
    eframe::run_native(
        "PySleuth",
        native_options,
        Box::new(move |_cc| Box::new(ui::create_app(session, api_url))),
    )
    .map_err(|e| anyhow::anyhow!("the PySleuth window exited with an error: {e}"))
}
