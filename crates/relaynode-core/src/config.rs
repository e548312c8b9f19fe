//! Static configuration for a relay node.
//!
//! Everything here is read once at startup; there is no reload path. The
//! configuration can be loaded from a JSON file, and every section falls
//! back to compiled defaults when absent, so a bare device still boots.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors that can occur while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file does not exist.
    NotFound(String),
    /// The configuration file could not be read.
    ReadError(String),
    /// The configuration file is not valid JSON for [`Config`].
    InvalidData(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => write!(f, "Configuration not found: {}", path),
            ConfigError::ReadError(msg) => write!(f, "Read error: {}", msg),
            ConfigError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Which electrical level drives the relay closed.
///
/// Active-low relay boards are common; the polarity is configuration, not
/// code, so the same firmware drives both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveLevel {
    High,
    Low,
}

impl ActiveLevel {
    /// The line level that means "relay ON".
    pub fn on_level(self) -> u8 {
        match self {
            ActiveLevel::High => 1,
            ActiveLevel::Low => 0,
        }
    }

    /// The line level that means "relay OFF".
    pub fn off_level(self) -> u8 {
        match self {
            ActiveLevel::High => 0,
            ActiveLevel::Low => 1,
        }
    }
}

impl Default for ActiveLevel {
    fn default() -> Self {
        ActiveLevel::High
    }
}

/// Identity of this device and its relay line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Unique device name reported to the hub and shown on the index page.
    pub name: String,

    /// Device category reported to the hub (e.g. "relay").
    pub device_type: String,

    /// GPIO pin number the relay control line is wired to.
    pub relay_pin: u8,

    /// Relay polarity.
    pub active_level: ActiveLevel,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: "relaynode".to_string(),
            device_type: "relay".to_string(),
            relay_pin: 15,
            active_level: ActiveLevel::High,
        }
    }
}

/// WiFi credentials (empty SSID means "no wireless configured").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    pub ssid: String,
    pub password: String,
}

/// Where and how to register with the coordinator hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Hub IP address or hostname.
    pub host: String,

    /// Hub HTTP port.
    pub port: u16,

    /// Registration endpoint path on the hub.
    pub path: String,

    /// Upper bound on one whole registration attempt, in seconds.
    pub timeout_secs: u64,

    /// How often to check whether re-registration is needed, in seconds.
    pub check_interval_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 80,
            path: "/device/register".to_string(),
            timeout_secs: 10,
            check_interval_secs: 300,
        }
    }
}

/// Local API listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Port the relay API listens on.
    pub port: u16,

    /// Bounded wait for one inbound connection, in milliseconds. This is
    /// also the worst-case latency before a due registration is noticed.
    pub accept_wait_ms: u64,

    /// Per-client read/respond deadline, in seconds.
    pub client_timeout_secs: u64,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            port: 80,
            accept_wait_ms: 1000,
            client_timeout_secs: 10,
        }
    }
}

/// Full startup configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device: DeviceConfig,
    pub wifi: WifiConfig,
    pub hub: HubConfig,
    pub server: ListenConfig,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::InvalidData(e.to_string()))
    }
}
