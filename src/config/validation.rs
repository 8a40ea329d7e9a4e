//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Preload hosts must be domain names, never IP literals
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::store::HostComponent;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("preload[{index}]: '{host}' is not a valid domain name")]
    InvalidPreloadHost { index: usize, host: String },

    #[error("preload[{index}]: '{host}' is an IP literal and can never be a Known HSTS Host")]
    IpLiteralPreloadHost { index: usize, host: String },

    #[error("transport.timeout_secs must be greater than 0")]
    ZeroTimeout,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (index, preload) in config.preload.iter().enumerate() {
        match HostComponent::parse(&preload.host) {
            Some(HostComponent::Domain(_)) => {}
            Some(HostComponent::Ip(_)) => errors.push(ValidationError::IpLiteralPreloadHost {
                index,
                host: preload.host.clone(),
            }),
            None => errors.push(ValidationError::InvalidPreloadHost {
                index,
                host: preload.host.clone(),
            }),
        }
    }

    if config.transport.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
