//! # Configuration Management
//!
//! Centralized configuration for the switch protocol client.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()` (`SWITCH_PROTOCOL_*`)
//!
//! Durations are stored in milliseconds when serialized.

use crate::error::{constants, ProtocolError, Result};
use crate::utils::timeout;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Protocol version written into every request header
pub const PROTOCOL_VERSION: u8 = 1;

/// Port switches listen on ("tp" as a big-endian u16)
pub const REQUEST_PORT: u16 = 0x7470;

/// Port switches answer to
pub const RESPONSE_PORT: u16 = REQUEST_PORT + 1;

/// Largest datagram read from the socket
pub const MAX_DATAGRAM_SIZE: usize = 1500;

/// Sequence numbers are drawn uniformly from `0..=MAX_SEQUENCE_NUMBER`
pub const MAX_SEQUENCE_NUMBER: u16 = 1000;

/// Limited broadcast address used for discovery
pub const BROADCAST_ADDRESS: Ipv4Addr = Ipv4Addr::BROADCAST;

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NetworkConfig {
    /// Request / discovery behaviour
    #[serde(default)]
    pub client: ClientConfig,

    /// Socket configuration
    #[serde(default)]
    pub transport: TransportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NetworkConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("SWITCH_PROTOCOL_BIND_ADDRESS") {
            config.transport.bind_address = addr;
        }

        if let Ok(addr) = std::env::var("SWITCH_PROTOCOL_BROADCAST_ADDRESS") {
            config.client.broadcast_address = addr;
        }

        if let Ok(timeout) = std::env::var("SWITCH_PROTOCOL_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.client.operation_timeout = Duration::from_millis(val);
            }
        }

        if let Ok(timeout) = std::env::var("SWITCH_PROTOCOL_CABLE_TEST_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.client.cable_test_timeout = Duration::from_millis(val);
            }
        }

        if let Ok(window) = std::env::var("SWITCH_PROTOCOL_DISCOVERY_WINDOW_MS") {
            if let Ok(val) = window.parse::<u64>() {
                config.client.discovery_window = Duration::from_millis(val);
            }
        }

        if let Ok(port) = std::env::var("SWITCH_PROTOCOL_RESPONSE_PORT") {
            if let Ok(val) = port.parse::<u16>() {
                config.transport.response_port = val;
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.client.validate());
        errors.extend(self.transport.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Request and discovery behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Deadline for token, login, statistics and QoS requests
    #[serde(with = "duration_serde")]
    pub operation_timeout: Duration,

    /// Deadline for cable diagnostics
    #[serde(with = "duration_serde")]
    pub cable_test_timeout: Duration,

    /// How long a discovery request listens for answers
    #[serde(with = "duration_serde")]
    pub discovery_window: Duration,

    /// Address discovery requests are sent to
    pub broadcast_address: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            operation_timeout: timeout::DEFAULT_TIMEOUT,
            cable_test_timeout: timeout::CABLE_TEST_TIMEOUT,
            discovery_window: timeout::DISCOVERY_WINDOW,
            broadcast_address: BROADCAST_ADDRESS.to_string(),
        }
    }
}

impl ClientConfig {
    /// Parsed broadcast address
    pub fn broadcast_ip(&self) -> Result<Ipv4Addr> {
        self.broadcast_address.parse().map_err(|_| {
            ProtocolError::ConfigError(format!(
                "{}: '{}'",
                constants::ERR_INVALID_BROADCAST_ADDRESS,
                self.broadcast_address
            ))
        })
    }

    /// Validate client configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.broadcast_ip().is_err() {
            errors.push(format!(
                "Invalid broadcast address: '{}' (expected an IPv4 address such as '255.255.255.255')",
                self.broadcast_address
            ));
        }

        if self.operation_timeout.as_millis() < 10 {
            errors.push("Operation timeout too short (minimum: 10ms)".to_string());
        } else if self.operation_timeout.as_secs() > 60 {
            errors.push("Operation timeout too long (maximum: 60s)".to_string());
        }

        if self.cable_test_timeout < self.operation_timeout {
            errors.push("Cable test timeout should not be shorter than the operation timeout".to_string());
        } else if self.cable_test_timeout.as_secs() > 120 {
            errors.push("Cable test timeout too long (maximum: 120s)".to_string());
        }

        if self.discovery_window.as_millis() < 10 {
            errors.push("Discovery window too short (minimum: 10ms)".to_string());
        } else if self.discovery_window.as_secs() > 60 {
            errors.push("Discovery window too long (maximum: 60s)".to_string());
        }

        errors
    }
}

/// Socket configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Local address both sockets bind to
    pub bind_address: String,

    /// Remote port requests are sent to
    pub request_port: u16,

    /// Local port answers arrive on
    pub response_port: u16,

    /// Receive buffer size in bytes
    pub max_datagram_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bind_address: Ipv4Addr::UNSPECIFIED.to_string(),
            request_port: REQUEST_PORT,
            response_port: RESPONSE_PORT,
            max_datagram_size: MAX_DATAGRAM_SIZE,
        }
    }
}

impl TransportConfig {
    /// Parsed bind address
    pub fn bind_ip(&self) -> Result<IpAddr> {
        self.bind_address.parse().map_err(|_| {
            ProtocolError::ConfigError(format!(
                "{}: '{}'",
                constants::ERR_INVALID_BIND_ADDRESS,
                self.bind_address
            ))
        })
    }

    /// Validate transport configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.bind_address.is_empty() {
            errors.push("Bind address cannot be empty".to_string());
        } else if self.bind_ip().is_err() {
            errors.push(format!(
                "Invalid bind address format: '{}' (expected format: '0.0.0.0')",
                self.bind_address
            ));
        }

        if self.request_port == 0 {
            errors.push("Request port cannot be 0".to_string());
        }

        if self.max_datagram_size < crate::core::packet::HEADER_SIZE {
            errors.push(format!(
                "Max datagram size too small: {} bytes (minimum: {})",
                self.max_datagram_size,
                crate::core::packet::HEADER_SIZE
            ));
        } else if self.max_datagram_size > 65_535 {
            errors.push(format!(
                "Max datagram size too large: {} bytes (maximum: 65535)",
                self.max_datagram_size
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to log to file
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    pub log_file_path: Option<String>,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("smartswitch-protocol"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = level.as_str().to_ascii_lowercase();
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
