//! Configuration module for loading and parsing TOML configuration files.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an optional TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Front server configuration.
    pub server: ServerConfig,
    /// Backend process configuration.
    pub backend: BackendConfig,
}

/// Front server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
    /// Directory holding the built dashboard assets.
    pub static_dir: PathBuf,
    /// Document served for paths that match no asset.
    pub index_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: PathBuf::from("frontend/dist"),
            index_file: "index.html".to_string(),
        }
    }
}

impl ServerConfig {
    /// Path of the single-page-app entry document.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join(&self.index_file)
    }
}

/// Backend process configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Host the backend listens on.
    pub host: String,
    /// Port the backend listens on.
    pub port: u16,
    /// Whether the front server launches and supervises the backend.
    pub spawn: bool,
    /// Executable used to launch the backend.
    pub command: String,
    /// Arguments passed to `command`.
    pub args: Vec<String>,
    /// How long to wait for the backend to exit after forwarding a signal.
    pub shutdown_grace_ms: u64,
    /// Proxy request timeout; 0 disables it.
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5000,
            spawn: true,
            command: "python".to_string(),
            args: vec!["backend/main.py".to_string()],
            shutdown_grace_ms: 5000,
            timeout_ms: 0,
        }
    }
}

impl BackendConfig {
    /// Origin requests are proxied to, e.g. `http://localhost:5000`.
    #[must_use]
    pub fn origin(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Grace period after signal forwarding.
    #[must_use]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Proxy timeout, `None` when disabled.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Arguments
    /// * `content` - TOML content as string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the runtime configuration: the file named by `CONFIG_PATH` (or
    /// defaults), then `HOST` / `PORT` overrides from the environment.
    ///
    /// # Errors
    /// Returns error if the file cannot be loaded or an override is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(
            std::env::var("HOST").ok().as_deref(),
            std::env::var("PORT").ok().as_deref(),
        )?;
        Ok(config)
    }

    /// Applies host/port overrides.
    ///
    /// # Errors
    /// Returns error if `port` is not a valid port number.
    pub fn apply_overrides(
        &mut self,
        host: Option<&str>,
        port: Option<&str>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = host.filter(|h| !h.is_empty()) {
            self.server.host = host.to_string();
        }
        if let Some(port) = port.filter(|p| !p.is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("PORT must be a valid number: {port}")))?;
        }
        self.validate()
    }

    /// Validates the configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.is_empty() {
            return Err(ConfigError::InvalidValue(
                "server host cannot be empty".to_string(),
            ));
        }
        if self.server.index_file.is_empty() {
            return Err(ConfigError::InvalidValue(
                "server index_file cannot be empty".to_string(),
            ));
        }
        if self.backend.host.is_empty() {
            return Err(ConfigError::InvalidValue(
                "backend host cannot be empty".to_string(),
            ));
        }
        if self.backend.port == 0 {
            return Err(ConfigError::InvalidValue(
                "backend port must be positive".to_string(),
            ));
        }
        if self.backend.spawn && self.backend.command.is_empty() {
            return Err(ConfigError::InvalidValue(
                "backend command cannot be empty when spawn is enabled".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8080
static_dir = "dist"

[backend]
host = "127.0.0.1"
port = 5001
spawn = true
command = "python3"
args = ["-u", "backend/main.py"]
shutdown_grace_ms = 2000
timeout_ms = 15000
"#;

        let config = Config::parse(toml_content).expect("should parse");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.index_path(), PathBuf::from("dist/index.html"));
        assert_eq!(config.backend.origin(), "http://127.0.0.1:5001");
        assert_eq!(config.backend.command, "python3");
        assert_eq!(config.backend.args.len(), 2);
        assert_eq!(config.backend.shutdown_grace(), Duration::from_secs(2));
        assert_eq!(config.backend.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse("").expect("empty config uses defaults");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(
            config.server.index_path(),
            PathBuf::from("frontend/dist/index.html")
        );
        assert_eq!(config.backend.origin(), "http://localhost:5000");
        assert_eq!(config.backend.command, "python");
        assert_eq!(config.backend.args, vec!["backend/main.py".to_string()]);
        assert!(config.backend.spawn);
        assert!(config.backend.timeout().is_none());
    }

    #[test]
    fn test_partial_section() {
        let config = Config::parse("[backend]\nspawn = false\n").expect("should parse");
        assert!(!config.backend.spawn);
        assert_eq!(config.backend.port, 5000);
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(Some("127.0.0.1"), Some("4000"))
            .expect("valid overrides");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4000);

        config.apply_overrides(None, None).expect("no overrides");
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(None, Some("http"));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_validation_zero_backend_port() {
        let result = Config::parse("[backend]\nport = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_empty_command() {
        let result = Config::parse("[backend]\ncommand = \"\"\n");
        assert!(result.is_err());

        let config = Config::parse("[backend]\ncommand = \"\"\nspawn = false\n");
        assert!(config.is_ok());
    }

    #[test]
    fn test_unparseable() {
        let result = Config::parse("[server\nport = 1");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
