//! Client-side connection pooling for a cluster of interchangeable HTTP nodes.
//!
//! ```text
//! caller → Transport::perform → ConnectionPool::next → HTTP I/O
//!                                      ↑                  │ network error
//!                 resurrector ─────────┤                  ▼
//!                 (backoff)            └──────── ConnectionPool::remove
//! ```

pub mod config;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod pool;
pub mod transport;

pub use config::ClientConfig;
pub use pool::{Connection, ConnectionPool, PoolError, PoolSnapshot, RoundRobinPool, SinglePool};
pub use transport::{Transport, TransportError};
