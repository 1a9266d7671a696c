//! Configuration validation.
//!
//! Runs once at startup after parsing; collects every problem instead of
//! failing on the first one so operators fix a config in one pass.

use super::types::Config;

pub fn validate(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.server.listen_addr.parse::<std::net::SocketAddr>().is_err() {
        errors.push(format!(
            "[server].listen_addr '{}' is not a valid socket address",
            config.server.listen_addr
        ));
    }

    if config.security.connection_rate.limit == 0 {
        errors.push("[security.connection_rate].limit must be > 0".to_string());
    }
    if config.security.connection_rate.window_secs == 0 {
        errors.push("[security.connection_rate].window_secs must be > 0".to_string());
    }
    if config.security.message_rate.limit == 0 {
        errors.push("[security.message_rate].limit must be > 0".to_string());
    }
    if config.security.message_rate.window_secs == 0 {
        errors.push("[security.message_rate].window_secs must be > 0".to_string());
    }
    if config.security.max_message_len == 0 {
        errors.push("[security].max_message_len must be > 0".to_string());
    }

    if config.session.outbound_queue_limit == 0 {
        errors.push("[session].outbound_queue_limit must be > 0".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn zero_limit_is_rejected() {
        let mut config = Config::default();
        config.security.message_rate.limit = 0;
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("message_rate")));
    }

    #[test]
    fn bad_listen_addr_is_rejected() {
        let mut config = Config::default();
        config.server.listen_addr = "not-an-address".to_string();
        assert!(validate(&config).is_err());
    }
}
