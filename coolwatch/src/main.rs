//! CoolWatch - Facility cooling-equipment monitoring dashboard.
//!
//! This application polls the monitoring backend's REST API, subscribes
//! to its push channel at `/ws` and renders live heat-exchanger status.

use std::path::PathBuf;

use clap::Parser;

use coolwatch_api::{ApiClient, ClientConfig, default_config_path, init_tracing, load_config};

mod app;
mod demo;
mod message;
mod prefs;
mod snapshot;
mod subscription;
mod view;

use app::CoolWatch;

#[derive(Parser, Debug)]
#[command(about = "CoolWatch monitoring dashboard")]
struct Args {
    /// Path to configuration file (JSON5).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration file.
    #[arg(long)]
    server: Option<String>,

    /// Run with synthetic data, without a backend.
    #[arg(long)]
    demo: bool,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config: ClientConfig = match &args.config {
        Some(path) => load_config(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => load_config(path)?,
            None => ClientConfig::default(),
        },
    };

    if let Some(server) = args.server {
        config.server.url = server;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_tracing(&config.logging)?;

    tracing::info!(
        server = %config.server.url,
        demo = args.demo,
        "Starting CoolWatch"
    );

    let client = ApiClient::new(&config.server)?;
    let demo = args.demo;

    // Run the Iced application
    iced::application(
        move || CoolWatch::boot(config.clone(), client.clone(), demo),
        CoolWatch::update,
        CoolWatch::view,
    )
    .title(CoolWatch::title)
    .subscription(CoolWatch::subscription)
    .theme(CoolWatch::theme)
    .run()
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
