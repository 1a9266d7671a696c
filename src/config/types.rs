//! Configuration type definitions.

use serde::Deserialize;

use super::defaults::*;

/// Log output format, selected via `[server].log_format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Top-level configuration, loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            security: SecurityConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Network listener and logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the combined HTTP/WebSocket/admin server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            log_format: LogFormat::default(),
        }
    }
}

/// SQLite persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Rate-limit quota for one action (`connection` or `message`).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimitRule {
    pub limit: u32,
    pub window_secs: u64,
}

/// Rate limiting and ban gate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_connection_rule")]
    pub connection_rate: RateLimitRule,
    #[serde(default = "default_message_rule")]
    pub message_rate: RateLimitRule,
    #[serde(default = "default_ban_cache_ttl_secs")]
    pub ban_cache_ttl_secs: u64,
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

fn default_connection_rule() -> RateLimitRule {
    RateLimitRule {
        limit: default_connection_limit(),
        window_secs: default_connection_window_secs(),
    }
}

fn default_message_rule() -> RateLimitRule {
    RateLimitRule {
        limit: default_message_limit(),
        window_secs: default_message_window_secs(),
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            connection_rate: default_connection_rule(),
            message_rate: default_message_rule(),
            ban_cache_ttl_secs: default_ban_cache_ttl_secs(),
            max_message_len: default_max_message_len(),
        }
    }
}

/// Session lifecycle tuning: idle timeouts, outbound backpressure, typing
/// coalescing.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_idle_timeout_mins")]
    pub idle_timeout_mins: u64,
    #[serde(default = "default_outbound_queue_limit")]
    pub outbound_queue_limit: usize,
    #[serde(default = "default_typing_coalesce_ms")]
    pub typing_coalesce_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_mins: default_idle_timeout_mins(),
            outbound_queue_limit: default_outbound_queue_limit(),
            typing_coalesce_ms: default_typing_coalesce_ms(),
        }
    }
}
