//! Runtime configuration for the relay.
//!
//! Values are resolved in three layers: built-in defaults, an optional YAML file
//! (path taken from `CCRELAY_CONFIG`), then individual environment overrides.
//! `AUTHORIZATION_KEY` is the only value without a usable default.
//!
//! ```yaml
//! server:
//!   port: 3000
//! proxy:
//!   authorization_key: "Bearer sk-relay"
//!   stream_delay_ms: 1000
//! log:
//!   level: debug
//! ```

use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use thiserror::Error;

use crate::constants::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Read { path: String, error: String },
    #[error("Failed to parse config file {path}: {error}")]
    Parse { path: String, error: String },
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("Unknown log level: {0}")]
    InvalidLogLevel(String),
    #[error("Authorization key is not configured, set {} or proxy.authorization_key", ENV_AUTHORIZATION_KEY)]
    MissingAuthorizationKey,
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub server: ServerConfig,
    pub proxy: ProxyConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body, in megabytes.
    pub body_limit_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            body_limit_mb: DEFAULT_BODY_LIMIT_MB,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Full expected `Authorization` header value, e.g. `Bearer sk-...`.
    pub authorization_key: String,
    pub upstream_url: String,
    /// Sent as `User-Agent` on upstream calls. Empty disables the header.
    pub user_agent: String,
    pub stream_delay_ms: u64,
    /// Upstream request timeout in seconds, 0 means no timeout.
    pub timeout_secs: u64,
    /// Write proxied request and response bodies to the `ccproxy_logger` target.
    pub log_to_file: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            authorization_key: String::new(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            stream_delay_ms: DEFAULT_STREAM_DELAY_MS,
            timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            log_to_file: false,
        }
    }
}

impl ProxyConfig {
    pub fn user_agent(&self) -> Option<&str> {
        Some(self.user_agent.trim()).filter(|ua| !ua.is_empty())
    }

    pub fn stream_delay(&self) -> Duration {
        Duration::from_millis(self.stream_delay_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
    /// Dedicated file for records logged to the `ccproxy_logger` target.
    pub proxy_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
            proxy_file: None,
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> ConfigResult<log::LevelFilter> {
        log::LevelFilter::from_str(self.level.trim())
            .map_err(|_| ConfigError::InvalidLogLevel(self.level.clone()))
    }
}

impl RelayConfig {
    /// Loads the configuration from `CCRELAY_CONFIG` (if set) and the process environment.
    pub fn load() -> ConfigResult<Self> {
        let config_path = std::env::var(ENV_CONFIG_FILE)
            .ok()
            .filter(|p| !p.trim().is_empty());

        let mut config = match config_path {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Applies environment overrides using `lookup` to resolve variable names.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_AUTHORIZATION_KEY) {
            self.proxy.authorization_key = key;
        }
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = parse_override(ENV_PORT, &port)?;
        }
        if let Some(url) = lookup(ENV_UPSTREAM_URL) {
            self.proxy.upstream_url = url;
        }
        if let Some(user_agent) = lookup(ENV_USER_AGENT) {
            self.proxy.user_agent = user_agent;
        }
        if let Some(delay) = lookup(ENV_STREAM_DELAY_MS) {
            self.proxy.stream_delay_ms = parse_override(ENV_STREAM_DELAY_MS, &delay)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.proxy.authorization_key.trim().is_empty() {
            return Err(ConfigError::MissingAuthorizationKey);
        }
        if self.proxy.upstream_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "proxy.upstream_url".to_string(),
                value: self.proxy.upstream_url.clone(),
            });
        }
        self.log.level_filter()?;
        Ok(())
    }
}

fn parse_override<T: FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
