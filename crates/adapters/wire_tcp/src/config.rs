//! Device connection configuration.

use std::time::Duration;

use serde::Deserialize;

/// How to reach the lighting controller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WireConfig {
    /// Controller hostname or IP address.
    pub host: String,
    /// Controller TCP port.
    pub port: u16,
    /// 11-character serial embedded in every frame.
    pub device_id: String,
    /// Budget for one whole exchange (connect, write, read), in milliseconds.
    pub timeout_ms: u64,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            host: "10.0.2.116".to_string(),
            port: 80,
            device_id: "R5S2A000188".to_string(),
            timeout_ms: 2000,
        }
    }
}

impl WireConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
