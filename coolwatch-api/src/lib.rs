//! CoolWatch Client Library
//!
//! This crate provides the shared pieces of the CoolWatch frontend:
//!
//! - [`model`] - Wire data model (`HeatExchanger`, `Telemetry`, `Alert`, ...)
//! - [`event`] - Push-channel event decoding (`PushEvent`)
//! - [`client`] - Typed REST client for the monitoring backend
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`error`] - Error types

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod model;

// Re-export commonly used types at the crate root
pub use client::{AlertQuery, AlertStatusFilter, ApiClient};
pub use config::{
    ClientConfig, LogFormat, LoggingConfig, RefreshConfig, ServerConfig, default_config_path,
    load_config, parse_config,
};
pub use error::{Error, Result};
pub use event::PushEvent;
pub use model::{
    Alert, AlertCount, FanReading, HeatExchanger, HeatExchangerUpsert, Location,
    MonitoringSettings, Program, PumpReading, Severity, Stats, Status, Telemetry, User, UserUpsert,
};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
