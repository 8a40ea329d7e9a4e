//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the HSTS client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Enforcement policy knobs.
    pub policy: PolicyConfig,

    /// Hosts pinned as permanent Known HSTS Hosts at startup.
    pub preload: Vec<PreloadConfig>,

    /// Outbound transport settings.
    pub transport: TransportConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Enforcement policy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Ignore Strict-Transport-Security headers received over plain http
    /// (RFC 6797 §8.1). Off by default so hosts can be learned over http.
    pub ignore_insecure_headers: bool,
}

/// A preloaded host.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PreloadConfig {
    /// Domain name to pin.
    pub host: String,

    /// Also cover all subdomains.
    #[serde(default)]
    pub include_subdomains: bool,
}

/// Outbound transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Total time allowed per request, in seconds.
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Maximum redirects followed per request (0 disables redirects).
    pub max_redirects: usize,

    /// Honour HTTP_PROXY / HTTPS_PROXY from the environment.
    pub system_proxy: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("hsts-client/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 10,
            system_proxy: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert!(!config.policy.ignore_insecure_headers);
        assert!(config.preload.is_empty());
        assert_eq!(config.transport.timeout_secs, 30);
        assert!(config.transport.system_proxy);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_full_config() {
        let config: ClientConfig = toml::from_str(
            r#"
            [policy]
            ignore_insecure_headers = true

            [[preload]]
            host = "example.com"
            include_subdomains = true

            [[preload]]
            host = "example.org"

            [transport]
            timeout_secs = 5
            max_redirects = 0

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert!(config.policy.ignore_insecure_headers);
        assert_eq!(
            config.preload,
            vec![
                PreloadConfig {
                    host: "example.com".into(),
                    include_subdomains: true
                },
                PreloadConfig {
                    host: "example.org".into(),
                    include_subdomains: false
                },
            ]
        );
        assert_eq!(config.transport.timeout_secs, 5);
        assert_eq!(config.transport.max_redirects, 0);
        assert!(config.transport.user_agent.starts_with("hsts-client/"));
        assert_eq!(config.observability.log_level, "debug");
    }
}
