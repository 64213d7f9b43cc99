//! Connection pool subsystem.
//!
//! # Data Flow
//! ```text
//! Transport needs a node
//!     → ConnectionPool::next()
//!         - single.rs (always the one node)
//!         - round_robin.rs (rotate through active nodes)
//!     → Perform I/O against connection.url()
//!     → On failure: ConnectionPool::remove(conn)
//!         → connection.rs marks it dead
//!         → round_robin.rs moves it to the dead list
//!         → health::resurrector brings it back after backoff
//! ```
//!
//! # Design Decisions
//! - Two lock domains: the pool lock guards membership, each connection
//!   guards its own health. Pool lock is always taken first.
//! - `remove()` is infallible; racing removals are silent no-ops
//! - Observers are injected per pool, never global

pub mod connection;
pub mod round_robin;
pub mod single;

use std::sync::Arc;
use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;

use crate::config::ResurrectionConfig;
use crate::observability::observer::PoolObserver;
pub use connection::{Connection, ConnectionSnapshot, Health};
pub use round_robin::RoundRobinPool;
pub use single::SinglePool;

/// Errors originating from the pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Neither active nor dead connections exist.
    #[error("no connection available")]
    NoConnectionAvailable,
}

/// Selection and quarantine of cluster nodes.
pub trait ConnectionPool: Send + Sync + std::fmt::Debug {
    /// Select the connection for the next request.
    fn next(&self) -> Result<Arc<Connection>, PoolError>;

    /// Report `conn` as failed. Never fails, even when the connection was
    /// already removed by a concurrent caller.
    fn remove(&self, conn: &Arc<Connection>);

    /// Current composition of the pool.
    fn snapshot(&self) -> PoolSnapshot;

    /// Stop background work owned by the pool.
    fn close(&self) {}
}

/// Read-only view of pool composition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub active: Vec<ConnectionSnapshot>,
    /// Sorted by descending failure count.
    pub dead: Vec<ConnectionSnapshot>,
}

impl PoolSnapshot {
    pub(crate) fn capture(active: &[Arc<Connection>], dead: &[Arc<Connection>]) -> Self {
        let now = Instant::now();
        Self {
            active: active.iter().map(|c| c.snapshot(now)).collect(),
            dead: dead.iter().map(|c| c.snapshot(now)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.dead.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the pool appropriate for the number of nodes.
///
/// A single node gets a [`SinglePool`] with no health tracking; anything
/// else (including zero nodes) gets a [`RoundRobinPool`] with a running
/// resurrector.
pub fn build(
    mut connections: Vec<Arc<Connection>>,
    config: ResurrectionConfig,
    observer: Option<Arc<dyn PoolObserver>>,
) -> Arc<dyn ConnectionPool> {
    if connections.len() == 1 {
        if let Some(conn) = connections.pop() {
            return Arc::new(SinglePool::new(conn));
        }
    }
    RoundRobinPool::new(connections, config, observer)
}
