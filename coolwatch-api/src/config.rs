use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Backend server connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the backend, e.g. "http://localhost:8000".
    #[serde(default = "default_url")]
    pub url: String,

    /// Optional path prefix when the dashboard is served behind a proxy,
    /// e.g. "/cooling-monitor".
    #[serde(default)]
    pub path_prefix: String,
}

fn default_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            path_prefix: String::new(),
        }
    }
}

impl ServerConfig {
    /// REST base, e.g. "http://localhost:8000/api".
    pub fn api_base(&self) -> String {
        format!(
            "{}{}/api",
            self.url.trim_end_matches('/'),
            self.path_prefix
        )
    }

    /// Push-channel endpoint derived from the HTTP base URL
    /// ("http" becomes "ws", "https" becomes "wss").
    pub fn ws_url(&self) -> Result<String> {
        let base = self.url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            return Err(Error::Url(self.url.clone()));
        };
        Ok(format!("{}{}/ws", ws_base, self.path_prefix))
    }
}

/// Timing configuration for refresh and reconnection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Interval of the authoritative full refresh, in seconds.
    #[serde(default = "default_full_refresh_secs")]
    pub full_refresh_secs: u64,

    /// Interval of the alert-badge count refresh, in seconds.
    #[serde(default = "default_alert_badge_secs")]
    pub alert_badge_secs: u64,

    /// Fixed delay before a push-channel reconnect attempt, in seconds.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
}

fn default_full_refresh_secs() -> u64 {
    10
}

fn default_alert_badge_secs() -> u64 {
    30
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            full_refresh_secs: default_full_refresh_secs(),
            alert_badge_secs: default_alert_badge_secs(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default configuration file path inside the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("coolwatch").join("config.json5"))
}

/// Load a configuration file in JSON5 format.
pub fn load_config<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&content)
}

/// Load a configuration from a JSON5 string.
pub fn parse_config<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    json5::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_config() {
        let json5 = r#"
        {
            server: {
                url: "https://cooling.example.com",
                path_prefix: "/cooling-monitor",
            },
            refresh: {
                full_refresh_secs: 5,
            },
            logging: {
                level: "debug",
            },
        }
        "#;

        let config: ClientConfig = parse_config(json5).unwrap();

        assert_eq!(config.server.url, "https://cooling.example.com");
        assert_eq!(config.server.path_prefix, "/cooling-monitor");
        assert_eq!(config.refresh.full_refresh_secs, 5);
        assert_eq!(config.refresh.reconnect_delay_secs, 5);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_default_config() {
        let config: ClientConfig = parse_config("{}").unwrap();

        assert_eq!(config.server.url, "http://localhost:8000");
        assert_eq!(config.server.path_prefix, "");
        assert_eq!(config.refresh.full_refresh_secs, 10);
        assert_eq!(config.refresh.alert_badge_secs, 30);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_api_base_and_ws_url() {
        let server = ServerConfig {
            url: "http://localhost:8000/".to_string(),
            path_prefix: String::new(),
        };
        assert_eq!(server.api_base(), "http://localhost:8000/api");
        assert_eq!(server.ws_url().unwrap(), "ws://localhost:8000/ws");

        let proxied = ServerConfig {
            url: "https://cooling.example.com".to_string(),
            path_prefix: "/cooling-monitor".to_string(),
        };
        assert_eq!(
            proxied.api_base(),
            "https://cooling.example.com/cooling-monitor/api"
        );
        assert_eq!(
            proxied.ws_url().unwrap(),
            "wss://cooling.example.com/cooling-monitor/ws"
        );
    }

    #[test]
    fn test_ws_url_rejects_unknown_scheme() {
        let server = ServerConfig {
            url: "ftp://example.com".to_string(),
            path_prefix: String::new(),
        };
        assert!(server.ws_url().is_err());
    }
}
