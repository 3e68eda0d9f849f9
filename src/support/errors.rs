use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("No tax rules found for city: {0}")]
    UnknownCity(String),

    #[error("Invalid timestamp '{value}'. Expected format: yyyy-MM-dd HH:mm:ss ({reason})")]
    MalformedTimestamp { value: String, reason: String },

    #[error("Unknown vehicle type: {0}")]
    UnknownVehicleType(String),

    #[error("Invalid rules for {city}: {reason}")]
    InvalidRules { city: String, reason: String },
}

impl DomainError {
    /// Whether the error is caused by the caller's input rather than by
    /// server-side configuration.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, DomainError::InvalidRules { .. })
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid rule file {path}: {source}")]
    RuleFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("No tax rules loaded (enable rules.include_builtin or add rules.paths)")]
    NoRulesLoaded,

    #[error("Cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infra(#[from] InfraError),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type for operations that touch the outside world
pub type AppResult<T> = Result<T, AppError>;
