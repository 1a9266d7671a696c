//! Configuration loading and management.
//!
//! Split into logical submodules:
//! - [`types`]: core config struct definitions
//! - [`defaults`]: serde default-value functions
//! - [`validation`]: post-load validation pass

mod defaults;
mod types;
mod validation;

pub use types::{Config, DatabaseConfig, LogFormat, RateLimitRule, SecurityConfig, ServerConfig, SessionConfig};
pub use validation::validate;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults for any
    /// section or field the file omits.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }
}
