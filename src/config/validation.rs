//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check descriptor shape before any network I/O
//! - Validate value ranges (timeouts > 0, ports valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - Runs before the monitor is constructed

use thiserror::Error;
use url::Url;

use crate::config::schema::MonitorConfig;
use crate::discovery::resolver::ProxyDescriptor;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No proxy descriptors configured; the monitor would have nothing to do.
    #[error("no proxies configured")]
    NoProxies,

    /// A descriptor did not parse as `port:management_port:user:password`.
    #[error("invalid proxy descriptor `{descriptor}`: {reason}")]
    BadDescriptor { descriptor: String, reason: String },

    /// The alert group target is required for routing notifications.
    #[error("alerting.alert_group must not be empty")]
    EmptyAlertGroup,

    /// The alerting endpoint is not a usable URL.
    #[error("invalid alerting endpoint `{endpoint}`: {reason}")]
    BadAlertEndpoint { endpoint: String, reason: String },

    /// The discovery command path is empty.
    #[error("discovery.command must not be empty")]
    EmptyDiscoveryCommand,

    /// A timeout of zero would make the corresponding call unbounded-or-instant.
    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    /// A worker pool of zero can never make progress.
    #[error("workers.max_workers must be greater than zero")]
    NoWorkers,
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.proxies.is_empty() {
        errors.push(ValidationError::NoProxies);
    }
    for descriptor in &config.proxies {
        if let Err(e) = ProxyDescriptor::parse(descriptor) {
            errors.push(ValidationError::BadDescriptor {
                descriptor: descriptor.clone(),
                reason: e.to_string(),
            });
        }
    }

    if config.alerting.alert_group.is_empty() {
        errors.push(ValidationError::EmptyAlertGroup);
    }
    if let Err(e) = Url::parse(&config.alerting.endpoint) {
        errors.push(ValidationError::BadAlertEndpoint {
            endpoint: config.alerting.endpoint.clone(),
            reason: e.to_string(),
        });
    }

    if config.discovery.command.is_empty() {
        errors.push(ValidationError::EmptyDiscoveryCommand);
    }

    for (field, value) in [
        ("discovery.timeout_secs", config.discovery.timeout_secs),
        ("probe.timeout_secs", config.probe.timeout_secs),
        ("fetch.timeout_secs", config.fetch.timeout_secs),
        ("alerting.timeout_secs", config.alerting.timeout_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout { field });
        }
    }

    if config.workers.max_workers == 0 {
        errors.push(ValidationError::NoWorkers);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
