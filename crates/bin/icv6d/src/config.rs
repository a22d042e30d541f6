//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `icv6.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use icv6_adapter_wire_tcp::{DeviceSerial, WireConfig};
use icv6_domain::reconciliation::{MAX_INTERVAL_MINUTES, PollingConfig};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Lighting controller connection.
    pub device: WireConfig,
    /// Background loop settings.
    pub reconciliation: ReconciliationConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Reconciliation loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Start the loop as soon as the database is ready.
    pub autostart: bool,
    /// Polling switch used until an operator stores one.
    pub default_enabled: bool,
    /// Polling interval used until an operator stores one.
    pub default_interval_minutes: u32,
}

impl ReconciliationConfig {
    /// Polling settings to fall back on when none are stored.
    #[must_use]
    pub fn defaults(&self) -> PollingConfig {
        PollingConfig {
            enabled: self.default_enabled,
            interval_minutes: self.default_interval_minutes,
        }
    }
}

impl Config {
    /// Load configuration from `icv6.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("icv6.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("ICV6_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("ICV6_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Some(val) = lookup("ICV6_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("ICV6_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = lookup("ICV6_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("ICV6_DEVICE_HOST") {
            self.device.host = val;
        }
        if let Some(val) = lookup("ICV6_DEVICE_PORT")
            && let Ok(port) = val.parse()
        {
            self.device.port = port;
        }
        if let Some(val) = lookup("ICV6_DEVICE_ID") {
            self.device.device_id = val;
        }
        if let Some(val) = lookup("ICV6_DEVICE_TIMEOUT_MS")
            && let Ok(timeout_ms) = val.parse()
        {
            self.device.timeout_ms = timeout_ms;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if let Err(err) = DeviceSerial::new(&self.device.device_id) {
            return Err(ConfigError::Validation(err.to_string()));
        }
        if self.device.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "device timeout must be non-zero".to_string(),
            ));
        }
        if self.reconciliation.defaults().validate().is_err() {
            return Err(ConfigError::Validation(format!(
                "default interval must be between 1 and {MAX_INTERVAL_MINUTES} minutes"
            )));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:icv6.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "icv6d=info,icv6=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        let polling = PollingConfig::default();
        Self {
            autostart: true,
            default_enabled: polling.enabled,
            default_interval_minutes: polling.interval_minutes,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
