//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::source::HttpSourceConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub poller: PollerConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Polling behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    #[serde(default = "default_live_row_cap")]
    pub live_row_cap: usize,

    #[serde(default = "default_seed_row_cap")]
    pub seed_row_cap: usize,

    pub seed_file: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_interval() -> u64 {
    300 // 5 minutes
}

fn default_timeout() -> u64 {
    7000
}

fn default_live_row_cap() -> usize {
    200
}

fn default_seed_row_cap() -> usize {
    100
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            interval_secs: default_interval(),
            timeout_ms: default_timeout(),
            live_row_cap: default_live_row_cap(),
            seed_row_cap: default_seed_row_cap(),
            seed_file: None,
        }
    }
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    /// Settings for the HTTP series source
    pub fn source_config(&self) -> HttpSourceConfig {
        HttpSourceConfig {
            base_url: self.base_url.clone(),
            timeout_ms: self.timeout_ms,
        }
    }
}

/// Rendered page output
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Write the dashboard HTML here after every cycle
    pub html_path: Option<PathBuf>,
}

/// Dashboard HTTP server
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_enabled")]
    pub enabled: bool,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_server_enabled() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_server_enabled(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
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
            dirs::config_dir().map(|p| p.join("painel").join("config.toml")),
            Some(PathBuf::from("/etc/painel/config.toml")),
            Some(PathBuf::from("./painel.toml")),
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
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Poller overrides
        if let Some(url) = lookup("PAINEL_BASE_URL") {
            self.poller.base_url = url;
        }
        if let Some(secs) = lookup("PAINEL_INTERVAL_SECS").and_then(|s| s.parse().ok()) {
            self.poller.interval_secs = secs;
        }
        if let Some(ms) = lookup("PAINEL_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
            self.poller.timeout_ms = ms;
        }
        if let Some(path) = lookup("PAINEL_SEED_FILE") {
            self.poller.seed_file = Some(PathBuf::from(path));
        }

        // Output overrides
        if let Some(path) = lookup("PAINEL_HTML_PATH") {
            self.output.html_path = Some(PathBuf::from(path));
        }

        // Server overrides
        if let Some(host) = lookup("PAINEL_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PAINEL_PORT").and_then(|s| s.parse().ok()) {
            self.server.port = port;
        }

        // Logging overrides
        if let Some(level) = lookup("PAINEL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("PAINEL_LOG_FORMAT") {
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
    r#"# Painel Configuration
#
# Environment variables override these settings:
# - PAINEL_BASE_URL
# - PAINEL_INTERVAL_SECS
# - PAINEL_TIMEOUT_MS
# - PAINEL_SEED_FILE
# - PAINEL_HTML_PATH
# - PAINEL_HOST
# - PAINEL_PORT
# - PAINEL_LOG_LEVEL
# - PAINEL_LOG_FORMAT

[poller]
# Base URL of the local series API
base_url = "http://127.0.0.1:8000"

# Seconds between polling cycles
interval_secs = 300

# Per-request timeout (ms)
timeout_ms = 7000

# Preview table row caps for live cycles and the seed render
live_row_cap = 200
seed_row_cap = 100

# Optional fallback series rendered before the first cycle
# seed_file = "seed.json"

[output]
# Optional path the dashboard HTML is written to after every cycle
# html_path = "dashboard.html"

[server]
# Serve the dashboard over HTTP
enabled = true
host = "127.0.0.1"
port = 8090

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
