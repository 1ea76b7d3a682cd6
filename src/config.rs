//! Configuration loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server identity.
    pub server: ServerConfig,
    /// Network listen configuration.
    pub listen: ListenConfig,
    /// Chat routing behavior.
    #[serde(default)]
    pub chat: ChatConfig,
    /// Per-connection flood limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name (e.g., "desk.example.net"), used in logs only.
    pub name: String,
}

/// WebSocket listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind, e.g. "127.0.0.1:9502".
    pub address: SocketAddr,
    /// Allowed Origin headers for the WebSocket handshake.
    /// Empty list allows all origins.
    #[serde(default)]
    pub allow_origins: Vec<String>,
}

/// Chat routing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Milliseconds a customer may stay silent in an active chat before
    /// being evicted (default: 60000).
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Display name for staff who announce themselves without one.
    #[serde(default = "default_staff_name")]
    pub default_staff_name: String,
}

impl ChatConfig {
    /// The idle window as a [`Duration`].
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: default_idle_timeout_ms(),
            default_staff_name: default_staff_name(),
        }
    }
}

fn default_idle_timeout_ms() -> u64 {
    60_000
}

fn default_staff_name() -> String {
    "Staff".to_string()
}

/// Per-connection frame rate limits (token bucket).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LimitsConfig {
    /// Frames per second replenished (default: 10).
    #[serde(default = "default_message_rate")]
    pub message_rate_per_second: f32,

    /// Burst capacity (default: 20).
    #[serde(default = "default_message_burst")]
    pub message_burst: f32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            message_rate_per_second: default_message_rate(),
            message_burst: default_message_burst(),
        }
    }
}

fn default_message_rate() -> f32 {
    10.0
}

fn default_message_burst() -> f32 {
    20.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn chat_defaults() {
        let chat = ChatConfig::default();
        assert_eq!(chat.idle_timeout_ms, 60_000);
        assert_eq!(chat.idle_timeout(), Duration::from_secs(60));
        assert_eq!(chat.default_staff_name, "Staff");
    }

    #[test]
    fn limits_defaults() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.message_rate_per_second, 10.0);
        assert_eq!(limits.message_burst, 20.0);
    }

    #[test]
    fn load_minimal_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
name = "desk.test"

[listen]
address = "127.0.0.1:9502"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.name, "desk.test");
        assert_eq!(config.listen.address.port(), 9502);
        assert!(config.listen.allow_origins.is_empty());
        assert_eq!(config.chat.idle_timeout_ms, 60_000);
    }

    #[test]
    fn load_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
name = "desk.test"

[listen]
address = "0.0.0.0:9502"
allow_origins = ["https://shop.example.com"]

[chat]
idle_timeout_ms = 5000
default_staff_name = "Support"

[limits]
message_rate_per_second = 100.0
message_burst = 200.0
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.listen.allow_origins.len(), 1);
        assert_eq!(config.chat.idle_timeout(), Duration::from_secs(5));
        assert_eq!(config.chat.default_staff_name, "Support");
        assert_eq!(config.limits.message_rate_per_second, 100.0);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/deskd.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn load_malformed_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not = [toml").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
