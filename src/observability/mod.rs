//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pool composition change (remove, fallback, resurrection):
//!     → observer.rs (injected PoolObserver, non-blocking)
//!         - ChannelObserver: bounded channel, drops when full
//!         - MetricsObserver: metrics.rs gauges
//!
//! All subsystems:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges)
//! ```
//!
//! # Design Decisions
//! - Observers are passed to each pool, never registered globally
//! - Observers run outside the pool lock and must not block
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
pub mod observer;
