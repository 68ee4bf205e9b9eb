//! Service configuration.
//!
//! Values are layered, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. A TOML file named by `STARS_FORECAST_CONFIG` (every key optional)
//! 3. Environment variable overrides
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [upstream]
//! base_url = "http://localhost:8080"
//! timeout_secs = 30
//!
//! [cache]
//! ttl_secs = 172800
//! capacity = 1000
//!
//! [forecast]
//! default_backend = "decomposition"
//!
//! [http]
//! cors = "permissive"
//! ```

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::models::ForecastBackend;

/// Environment variable holding the optional TOML config path.
pub const CONFIG_PATH_ENV: &str = "STARS_FORECAST_CONFIG";

/// Configuration errors, reported once at startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Cross-origin policy applied to every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorsPolicy {
    /// Any origin, method and header
    #[default]
    Permissive,
    /// No CORS headers at all
    Disabled,
}

impl FromStr for CorsPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "permissive" | "any" => Ok(Self::Permissive),
            "disabled" | "none" => Ok(Self::Disabled),
            _ => Err(format!("Unknown CORS policy: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for CorsPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        from_str_value(deserializer)
    }
}

fn from_str_value<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(de::Error::custom)
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerSettings,
    pub upstream: UpstreamSettings,
    pub cache: CacheSettings,
    pub forecast: ForecastSettings,
    pub http: HttpSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Star-history provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

impl UpstreamSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 2 * 24 * 60 * 60,
            capacity: 1000,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    /// Pipeline answering the bare `/predict` route
    #[serde(deserialize_with = "from_str_value")]
    pub default_backend: ForecastBackend,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            default_backend: ForecastBackend::Decomposition,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub cors: CorsPolicy,
}

impl ServiceConfig {
    /// Load configuration from a TOML file. Missing keys take defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Resolve the full configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error when the config file cannot be read or parsed, an
    /// override does not parse, or the result fails [`validate`](Self::validate).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an explicit variable lookup.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-style overrides on top of the current values.
    ///
    /// # Environment Variables
    /// - `HOST`, `PORT`
    /// - `STARS_API_URL`, `FETCH_TIMEOUT_SECS`
    /// - `CACHE_TTL_SECS`, `CACHE_CAPACITY`
    /// - `FORECAST_BACKEND`: `decomposition`/`prophet` or `smoothing`/`statsmodels`/`holt-winters`
    /// - `CORS_POLICY`: `permissive`/`any` or `disabled`/`none`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = parse_var(&lookup, "PORT")? {
            self.server.port = port;
        }
        if let Some(url) = lookup("STARS_API_URL") {
            self.upstream.base_url = url;
        }
        if let Some(timeout) = parse_var(&lookup, "FETCH_TIMEOUT_SECS")? {
            self.upstream.timeout_secs = timeout;
        }
        if let Some(ttl) = parse_var(&lookup, "CACHE_TTL_SECS")? {
            self.cache.ttl_secs = ttl;
        }
        if let Some(capacity) = parse_var(&lookup, "CACHE_CAPACITY")? {
            self.cache.capacity = capacity;
        }
        if let Some(backend) = parse_var(&lookup, "FORECAST_BACKEND")? {
            self.forecast.default_backend = backend;
        }
        if let Some(cors) = parse_var(&lookup, "CORS_POLICY")? {
            self.http.cors = cors;
        }
        Ok(())
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::invalid("server.host", "must not be empty"));
        }
        if self.upstream.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("upstream.base_url", "must not be empty"));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::invalid("upstream.timeout_secs", "must be positive"));
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::invalid("cache.ttl_secs", "must be positive"));
        }
        if self.cache.capacity == 0 {
            return Err(ConfigError::invalid("cache.capacity", "must be positive"));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::invalid(key, format!("'{}': {}", raw, e))),
        None => Ok(None),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
