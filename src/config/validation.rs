//! Configuration validation.
//!
//! Semantic checks on top of what serde already guarantees syntactically:
//! value ranges (policy fields > 0, timeouts > 0), addresses and URLs that
//! must parse, and bypass windows that must not be inverted. Returns all
//! errors, not just the first, so an operator can fix a config in one pass.

use std::net::SocketAddr;

use crate::config::schema::{FaucetConfig, RatePolicy};

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g., "limits.default.covered_hours").
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_policy(errors: &mut Vec<ValidationError>, prefix: &str, policy: &RatePolicy) {
    if policy.covered_hours <= 0.0 {
        errors.push(ValidationError {
            field: format!("{prefix}.covered_hours"),
            message: "must be greater than zero".to_string(),
        });
    }
    if policy.allowed_requests == 0 {
        errors.push(ValidationError {
            field: format!("{prefix}.allowed_requests"),
            message: "must be greater than zero".to_string(),
        });
    }
    if policy.max_amount_per_request <= 0.0 {
        errors.push(ValidationError {
            field: format!("{prefix}.max_amount_per_request"),
            message: "must be greater than zero".to_string(),
        });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<url::Url>().is_err() {
        errors.push(ValidationError {
            field: field.to_string(),
            message: format!("'{value}' is not a valid URL"),
        });
    }
}

/// Validate a configuration snapshot. Pure function; collects every error.
pub fn validate_config(config: &FaucetConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address".to_string(),
            message: format!("'{}' is not a valid socket address", config.listener.bind_address),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address".to_string(),
            message: format!(
                "'{}' is not a valid socket address",
                config.observability.metrics_address
            ),
        });
    }

    check_policy(&mut errors, "limits.default", &config.limits.default);
    check_policy(&mut errors, "limits.elevated", &config.limits.elevated);

    for (timeout, field) in [
        (config.timeouts.request_secs, "timeouts.request_secs"),
        (config.timeouts.captcha_secs, "timeouts.captcha_secs"),
        (config.timeouts.identity_secs, "timeouts.identity_secs"),
        (config.timeouts.records_secs, "timeouts.records_secs"),
        (config.timeouts.transfer_secs, "timeouts.transfer_secs"),
    ] {
        if timeout == 0 {
            errors.push(ValidationError {
                field: field.to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
    }

    for (i, entry) in config.bypass.iter().enumerate() {
        if entry.token.is_empty() {
            errors.push(ValidationError {
                field: format!("bypass[{i}].token"),
                message: "must not be empty".to_string(),
            });
        }
        if let (Some(start), Some(end)) = (entry.starts_at, entry.ends_at) {
            if start >= end {
                errors.push(ValidationError {
                    field: format!("bypass[{i}]"),
                    message: "starts_at must be earlier than ends_at".to_string(),
                });
            }
        }
    }

    check_url(&mut errors, "captcha.verify_url", &config.captcha.verify_url);
    check_url(&mut errors, "blockchain.devnet_url", &config.blockchain.devnet_url);
    check_url(&mut errors, "blockchain.testnet_url", &config.blockchain.testnet_url);
    if config.identity.enabled {
        check_url(&mut errors, "identity.base_url", &config.identity.base_url);
    }
    if config.records.enabled {
        check_url(&mut errors, "records.base_url", &config.records.base_url);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
