//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Longest accepted resurrector wake interval (one day).
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("node {node:?} is not a valid URL: {reason}")]
    InvalidNode { node: String, reason: String },

    #[error("node {0:?} must use http or https")]
    UnsupportedScheme(String),

    #[error("node {0:?} is listed more than once")]
    DuplicateNode(String),

    #[error("resurrection.interval_secs must be greater than zero")]
    ZeroInterval,

    #[error("resurrection.interval_secs must be at most {max}, got {0}", max = MAX_INTERVAL_SECS)]
    IntervalTooLarge(u64),

    #[error("resurrection.initial_timeout_secs must be greater than zero")]
    ZeroInitialTimeout,

    #[error("resurrection.timeout_factor_cutoff must be at most 31, got {0}")]
    CutoffTooLarge(u32),

    #[error("transport.request_timeout_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("transport.retry_on_status contains invalid status {0}")]
    InvalidStatus(u16),

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check every semantic rule and collect all violations.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for node in &config.nodes {
        match Url::parse(node) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    errors.push(ValidationError::UnsupportedScheme(node.clone()));
                }
                if !seen.insert(url) {
                    errors.push(ValidationError::DuplicateNode(node.clone()));
                }
            }
            Err(e) => errors.push(ValidationError::InvalidNode {
                node: node.clone(),
                reason: e.to_string(),
            }),
        }
    }

    let resurrection = &config.resurrection;
    if resurrection.interval_secs == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if resurrection.interval_secs > MAX_INTERVAL_SECS {
        errors.push(ValidationError::IntervalTooLarge(resurrection.interval_secs));
    }
    if resurrection.initial_timeout_secs == 0 {
        errors.push(ValidationError::ZeroInitialTimeout);
    }
    if resurrection.timeout_factor_cutoff > 31 {
        errors.push(ValidationError::CutoffTooLarge(resurrection.timeout_factor_cutoff));
    }

    if config.transport.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    for &status in &config.transport.retry_on_status {
        if !(100..=599).contains(&status) {
            errors.push(ValidationError::InvalidStatus(status));
        }
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(observability.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
