//! Configuration module
//!
//! The service reads a TOML file (default:
//! `~/.config/congestion-tax/config.toml`). Every field has a default, so an
//! empty or partial file is valid.
//!
//! ```toml
//! [server]
//! api_host = "0.0.0.0"
//! api_port = 8080
//! shutdown_timeout = 30
//!
//! [logging]
//! level = "info"
//! format = "pretty"   # or "json"
//!
//! [rules]
//! paths = ["/etc/congestion-tax/rules"]
//! default_city = "gothenburg"
//! include_builtin = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::support::errors::{AppResult, InfraError};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "CONGESTION_TAX_CONFIG";

/// Default config location: `<config dir>/congestion-tax/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("congestion-tax")
        .join("config.toml")
}

/// Config path from the environment, falling back to [`default_config_path`]
pub fn config_path_from_env() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub rules: RulesConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Where tax rules come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule files or directories of `*.json` rule files
    pub paths: Vec<PathBuf>,
    /// City used when a request does not name one
    pub default_city: String,
    /// Register the bundled Gothenburg 2013 rules before `paths`
    pub include_builtin: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            default_city: "gothenburg".to_string(),
            include_builtin: true,
        }
    }
}

impl AppConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| InfraError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> AppResult<Self> {
        Ok(toml::from_str(raw).map_err(InfraError::from)?)
    }

    /// Write as TOML, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let io_err = |source| InfraError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = toml::to_string_pretty(self).map_err(InfraError::from)?;
        fs::write(path, raw).map_err(io_err)?;
        Ok(())
    }
}
