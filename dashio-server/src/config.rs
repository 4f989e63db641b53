//! Server configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via DASHIO_CONFIG)
//! 3. Environment variables

use dashio_protocol::config::{ControlConfig, DeviceCfg};
use dashio_protocol::{FIELD_SEPARATOR, TERMINATOR};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network configuration.
    pub network: NetworkConfig,
    /// Device identity and layout.
    pub device: DeviceConfig,
}

impl Config {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("DASHIO_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        self.network.apply_env_overrides();
        self.device.apply_env_overrides();
    }

    /// Checks values the protocol cannot carry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.max_field_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "max_field_bytes must be greater than zero".to_string(),
            ));
        }
        self.device.validate()
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address to bind to.
    #[serde(with = "socket_addr_serde")]
    pub bind_addr: SocketAddr,
    /// Idle connection timeout in seconds.
    pub idle_timeout_secs: u64,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Longest field accepted before the connection's decoder is reset.
    pub max_field_bytes: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, dashio_protocol::DEFAULT_PORT)),
            idle_timeout_secs: 300,
            max_connections: 16,
            max_field_bytes: 4096,
        }
    }
}

impl NetworkConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("DASHIO_BIND") {
            if let Ok(parsed) = addr.parse() {
                self.bind_addr = parsed;
            }
        }

        if let Ok(timeout) = std::env::var("DASHIO_IDLE_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.idle_timeout_secs = secs;
            }
        }

        if let Ok(max) = std::env::var("DASHIO_MAX_CONNECTIONS") {
            if let Ok(n) = max.parse() {
                self.max_connections = n;
            }
        }

        if let Ok(max) = std::env::var("DASHIO_MAX_FIELD_BYTES") {
            if let Ok(n) = max.parse() {
                self.max_field_bytes = n;
            }
        }
    }

    /// Returns idle timeout as Duration.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// Device identity and dashboard layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub device_id: String,
    pub device_type: String,
    pub name: String,
    pub num_device_views: i32,
    /// Setup options the dashboard may offer, e.g. `name,wifi,tcp`.
    pub device_setup: String,
    /// Controls announced in reply to a configuration request.
    pub controls: Vec<ControlConfig>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_id: "dashio-device".to_string(),
            device_type: "DashIODevice".to_string(),
            name: "DashIO Device".to_string(),
            num_device_views: 0,
            device_setup: String::new(),
            controls: Vec::new(),
        }
    }
}

impl DeviceConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var("DASHIO_DEVICE_ID") {
            self.device_id = id;
        }
        if let Ok(device_type) = std::env::var("DASHIO_DEVICE_TYPE") {
            self.device_type = device_type;
        }
        if let Ok(name) = std::env::var("DASHIO_DEVICE_NAME") {
            self.name = name;
        }
    }

    /// Top-level device configuration payload.
    pub fn device_cfg(&self) -> DeviceCfg {
        DeviceCfg {
            num_device_views: self.num_device_views,
            device_setup: self.device_setup.clone(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.device_id.is_empty() {
            return Err(ConfigError::ValidationError(
                "device_id must not be empty".to_string(),
            ));
        }

        let fields = [
            ("device_id", &self.device_id),
            ("device_type", &self.device_type),
            ("name", &self.name),
        ];
        for (field, value) in fields {
            if value.contains([FIELD_SEPARATOR, TERMINATOR]) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must not contain tab or newline characters",
                    field
                )));
            }
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Custom serde module for SocketAddr (to handle as string in YAML).
mod socket_addr_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::net::SocketAddr;

    pub fn serialize<S>(addr: &SocketAddr, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&addr.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SocketAddr, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.network.bind_addr.port(), dashio_protocol::DEFAULT_PORT);
        assert_eq!(config.network.idle_timeout(), Duration::from_secs(300));
        assert!(config.device.controls.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.network.bind_addr, config.network.bind_addr);
        assert_eq!(parsed.device.device_id, config.device.device_id);
    }

    #[test]
    fn test_from_file_with_controls() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("device.yaml");
        std::fs::write(
            &path,
            r#"
network:
  bind_addr: "127.0.0.1:5651"
device:
  device_id: abc123
  name: Greenhouse
  num_device_views: 1
  controls:
    - kind: device_view
      control_id: DV01
      title: Main
    - kind: slider
      control_id: S1
      parent_id: DV01
      title: Fan
      max: 10
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.network.bind_addr.port(), 5651);
        assert_eq!(config.network.max_field_bytes, 4096);
        assert_eq!(config.device.device_id, "abc123");
        assert_eq!(config.device.device_type, "DashIODevice");
        assert_eq!(config.device.controls.len(), 2);
        assert_eq!(config.device.controls[1].control_id(), Some("S1"));
        assert_eq!(config.device.device_cfg().num_device_views, 1);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.yaml");

        let mut config = Config::default();
        config.device.name = "Shed".to_string();
        config.save(&path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.device.name, "Shed");
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/dashio.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(..)));
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "network: [unclosed").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(..)));
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.device.name = "bad\tname".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("name"));

        let mut config = Config::default();
        config.device.device_id.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.network.max_field_bytes = 0;
        assert!(config.validate().is_err());
    }
}
