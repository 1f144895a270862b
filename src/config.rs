use serde::{Deserialize, Serialize};

/// Default per-lookup timeout, applied independently to the initial query,
/// the IANA fallback and the referral hop.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub whois_timeout_seconds: u64,
    pub max_response_size: usize,
    pub prefer_ipv6: bool,
    pub ignore_socket_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            whois_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_response_size: 1024 * 1024,
            prefer_ipv6: false,
            ignore_socket_errors: true,
        }
    }
}

impl Config {
    /// Load defaults, then apply environment overrides. The `SOCKS` proxy
    /// variable is intentionally not handled here: the transport reads it
    /// from the process environment at connect time.
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut settings = config::Config::builder()
            .set_default("whois_timeout_seconds", DEFAULT_TIMEOUT_SECONDS)?
            .set_default("max_response_size", 1024 * 1024i64)?
            .set_default("prefer_ipv6", false)?
            .set_default("ignore_socket_errors", true)?;

        settings = Self::apply_env_overrides(settings)?;

        settings.build()?.try_deserialize()
    }

    fn apply_env_overrides(
        mut settings: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let env_mappings = [
            ("WHOIS_TIMEOUT_SECONDS", "whois_timeout_seconds"),
            ("WHOIS_TIMEOUT", "whois_timeout_seconds"),
            ("MAX_RESPONSE_SIZE", "max_response_size"),
            ("PREFER_IPV6", "prefer_ipv6"),
            ("IGNORE_SOCKET_ERRORS", "ignore_socket_errors"),
        ];

        for (env_var, config_key) in env_mappings {
            if let Ok(value) = std::env::var(env_var) {
                settings = settings.set_override(config_key, value)?;
            }
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_expectations() {
        let config = Config::default();
        assert_eq!(config.whois_timeout_seconds, 10);
        assert!(config.ignore_socket_errors);
        assert!(!config.prefer_ipv6);
    }
}
