//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

pub fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

pub fn default_database_path() -> String {
    "anonchat.db".to_string()
}

pub fn default_connection_limit() -> u32 {
    5
}

pub fn default_connection_window_secs() -> u64 {
    60
}

pub fn default_message_limit() -> u32 {
    20
}

pub fn default_message_window_secs() -> u64 {
    60
}

pub fn default_max_message_len() -> usize {
    2000
}

pub fn default_ban_cache_ttl_secs() -> u64 {
    30
}

pub fn default_idle_timeout_mins() -> u64 {
    30
}

pub fn default_outbound_queue_limit() -> usize {
    64
}

pub fn default_typing_coalesce_ms() -> u64 {
    2000
}
