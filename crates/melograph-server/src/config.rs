//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Filesystem locations served over HTTP.
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Busy timeout for SQLite connections, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled SQLite connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Filesystem locations for the frontend bundle and uploaded files.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    /// Directory holding the built frontend (contains `index.html` and
    /// `static/`).
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,

    /// Directory for uploaded recordings. Created on startup if missing.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "melograph_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "melograph.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_frontend_dir() -> String {
    "frontend/build".to_string()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            frontend_dir: default_frontend_dir(),
            upload_dir: default_upload_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// A missing file is not an error; every setting has a default. Environment
/// variable overrides:
/// - `MELOGRAPH_HOST` overrides `server.host`
/// - `MELOGRAPH_PORT` overrides `server.port`
/// - `MELOGRAPH_DB_PATH` overrides `database.path`
/// - `MELOGRAPH_FRONTEND_DIR` overrides `assets.frontend_dir`
/// - `MELOGRAPH_UPLOAD_DIR` overrides `assets.upload_dir`
/// - `MELOGRAPH_LOG_LEVEL` overrides `logging.level`
/// - `MELOGRAPH_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("MELOGRAPH_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("MELOGRAPH_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(db_path) = std::env::var("MELOGRAPH_DB_PATH") {
        config.database.path = db_path;
    }
    if let Ok(frontend_dir) = std::env::var("MELOGRAPH_FRONTEND_DIR") {
        config.assets.frontend_dir = frontend_dir;
    }
    if let Ok(upload_dir) = std::env::var("MELOGRAPH_UPLOAD_DIR") {
        config.assets.upload_dir = upload_dir;
    }
    if let Ok(level) = std::env::var("MELOGRAPH_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("MELOGRAPH_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}
