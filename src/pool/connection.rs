//! Connection abstraction.
//!
//! # Responsibilities
//! - Represent a single cluster node
//! - Track health state (dead flag, dead-since timestamp, failure count)
//! - Guard health state with a lock independent of any pool lock

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use serde::Serialize;
use tokio::time::Instant;
use url::Url;

/// Mutable health record, guarded by the connection lock.
#[derive(Debug, Clone, Copy, Default)]
struct HealthState {
    dead: bool,
    /// Only meaningful while `dead` is true.
    dead_since: Option<Instant>,
    /// Never reset.
    failures: u32,
}

/// Point-in-time copy of a connection's health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub dead: bool,
    pub dead_since: Option<Instant>,
    pub failures: u32,
}

/// A single cluster node.
#[derive(Debug)]
pub struct Connection {
    /// The address of the node.
    url: Url,
    state: Mutex<HealthState>,
}

impl Connection {
    /// Create a new, healthy connection.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            state: Mutex::new(HealthState::default()),
        }
    }

    /// The node address.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Read the current health under the connection lock.
    pub fn health(&self) -> Health {
        let state = self.lock();
        Health {
            dead: state.dead,
            dead_since: if state.dead { state.dead_since } else { None },
            failures: state.failures,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.lock().dead
    }

    pub fn failures(&self) -> u32 {
        self.lock().failures
    }

    /// Record a failure: the connection becomes dead as of `now`.
    pub fn mark_dead(&self, now: Instant) {
        let mut state = self.lock();
        state.dead = true;
        state.dead_since = Some(now);
        state.failures = state.failures.saturating_add(1);
    }

    /// Put the connection back into service. The failure count is kept.
    pub fn mark_alive(&self) {
        let mut state = self.lock();
        state.dead = false;
        state.dead_since = None;
    }

    /// Serializable view for observers and the CLI.
    pub fn snapshot(&self, now: Instant) -> ConnectionSnapshot {
        let health = self.health();
        ConnectionSnapshot {
            url: self.url.to_string(),
            dead: health.dead,
            failures: health.failures,
            dead_for_secs: health
                .dead_since
                .map(|since| now.saturating_duration_since(since).as_secs()),
        }
    }

    // Critical sections never leave the state half-written, so a poisoned
    // lock still holds a consistent record.
    fn lock(&self) -> MutexGuard<'_, HealthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let health = self.health();
        write!(f, "<{}> dead={} failures={}", self.url, health.dead, health.failures)
    }
}

/// Serializable health view of one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSnapshot {
    pub url: String,
    pub dead: bool,
    pub failures: u32,
    /// Seconds since the connection was marked dead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dead_for_secs: Option<u64>,
}

impl ConnectionSnapshot {
    pub fn dead_for(&self) -> Option<Duration> {
        self.dead_for_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(addr: &str) -> Connection {
        Connection::new(Url::parse(addr).unwrap())
    }

    #[test]
    fn test_new_connection_is_healthy() {
        let c = conn("http://127.0.0.1:9200");
        let health = c.health();
        assert!(!health.dead);
        assert_eq!(health.failures, 0);
        assert!(health.dead_since.is_none());
    }

    #[test]
    fn test_mark_dead_and_alive() {
        let c = conn("http://127.0.0.1:9200");
        let now = Instant::now();

        c.mark_dead(now);
        let health = c.health();
        assert!(health.dead);
        assert_eq!(health.dead_since, Some(now));
        assert_eq!(health.failures, 1);

        c.mark_alive();
        let health = c.health();
        assert!(!health.dead);
        assert!(health.dead_since.is_none());
        // failures survive resurrection
        assert_eq!(health.failures, 1);

        c.mark_dead(Instant::now());
        assert_eq!(c.failures(), 2);
    }

    #[test]
    fn test_display() {
        let c = conn("http://localhost:9200");
        c.mark_dead(Instant::now());
        assert_eq!(c.to_string(), "<http://localhost:9200/> dead=true failures=1");
    }

    #[test]
    fn test_snapshot_serializes() {
        let c = conn("http://localhost:9200");
        let json = serde_json::to_value(c.snapshot(Instant::now())).unwrap();
        assert_eq!(json["url"], "http://localhost:9200/");
        assert_eq!(json["dead"], false);
        assert!(json.get("dead_for_secs").is_none());
    }
}
