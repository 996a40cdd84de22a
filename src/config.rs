//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub time: TimeConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Reading log configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Raw-line cap applied to read-side scans (cost bound for large logs)
    #[serde(default = "default_max_scan_lines")]
    pub max_scan_lines: usize,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("monitoreo").to_string_lossy().to_string())
        .unwrap_or_else(|| "./monitoreo_data".to_string())
}

fn default_max_scan_lines() -> usize {
    50_000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_scan_lines: default_max_scan_lines(),
        }
    }
}

/// Local time configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeConfig {
    /// IANA zone name for local dates and bucket assignment.
    /// Unset or invalid falls back to UTC.
    pub zone: Option<String>,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// When set, `POST /api/datos` requires a matching `X-API-KEY` header
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("monitoreo").join("config.toml")),
            Some(PathBuf::from("/etc/monitoreo/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Store overrides
        if let Ok(data_dir) = std::env::var("MONITOREO_DATA_DIR") {
            self.store.data_dir = data_dir;
        }
        if let Ok(max) = std::env::var("MONITOREO_MAX_SCAN_LINES") {
            if let Ok(m) = max.parse() {
                self.store.max_scan_lines = m;
            }
        }

        // Time overrides
        if let Ok(zone) = std::env::var("MONITOREO_ZONE") {
            self.time.zone = Some(zone);
        }

        // API overrides
        if let Ok(host) = std::env::var("MONITOREO_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("MONITOREO_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }
        if let Ok(key) = std::env::var("MONITOREO_API_KEY") {
            self.api.api_key = Some(key);
        }

        // Logging overrides
        if let Ok(level) = std::env::var("MONITOREO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("MONITOREO_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Monitoreo Configuration
#
# Environment variables override these settings:
# - MONITOREO_DATA_DIR
# - MONITOREO_MAX_SCAN_LINES
# - MONITOREO_ZONE
# - MONITOREO_API_HOST
# - MONITOREO_API_PORT
# - MONITOREO_API_KEY
# - MONITOREO_LOG_LEVEL
# - MONITOREO_LOG_FORMAT

[store]
# Directory for the history log and snapshot files
data_dir = "~/.local/share/monitoreo"

# Raw-line cap for read-side scans
max_scan_lines = 50000

[time]
# IANA zone for local dates and bucket assignment (falls back to UTC)
zone = "America/Costa_Rica"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 5000

# Shared secret for POST /api/datos; leave unset to accept any producer
# api_key = ""

# Request timeout in seconds
request_timeout_secs = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
