//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::sync::Arc;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::validation::MAX_INTERVAL_SECS;
use crate::pool::Connection;

/// Root configuration for the cluster client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Node addresses (e.g., "http://127.0.0.1:9200").
    pub nodes: Vec<String>,

    /// Dead connection recovery settings.
    pub resurrection: ResurrectionConfig,

    /// Request execution settings.
    pub transport: TransportConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ClientConfig {
    /// Build one connection per configured node.
    pub fn connections(&self) -> Result<Vec<Arc<Connection>>, url::ParseError> {
        self.nodes
            .iter()
            .map(|node| Url::parse(node).map(|url| Arc::new(Connection::new(url))))
            .collect()
    }
}

/// Resurrection schedule.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResurrectionConfig {
    /// How often the resurrector wakes, in seconds.
    pub interval_secs: u64,

    /// Dead time after the first failure, in seconds.
    pub initial_timeout_secs: u64,

    /// Failure count past which the timeout stops doubling.
    pub timeout_factor_cutoff: u32,
}

impl ResurrectionConfig {
    pub fn interval(&self) -> Duration {
        // interval_at panics on a zero period, and huge periods overflow Instant
        Duration::from_secs(self.interval_secs.clamp(1, MAX_INTERVAL_SECS))
    }

    pub fn initial_timeout(&self) -> Duration {
        Duration::from_secs(self.initial_timeout_secs)
    }
}

impl Default for ResurrectionConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            initial_timeout_secs: 60,
            timeout_factor_cutoff: 5,
        }
    }
}

/// Request execution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Additional attempts after the first one, each on the next node.
    pub max_retries: u32,

    /// Total time for one request/response in seconds.
    pub request_timeout_secs: u64,

    /// Response statuses that trigger a retry on the next node.
    pub retry_on_status: Vec<u16>,
}

impl TransportConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            request_timeout_secs: 30,
            retry_on_status: vec![502, 503, 504],
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9091".to_string(),
        }
    }
}
