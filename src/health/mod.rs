//! Connection health recovery.
//!
//! # Data Flow
//! ```text
//! Request failure observed (transport)
//!     → pool.remove(conn)
//!     → connection marked dead, failures += 1
//!
//! Resurrector (resurrector.rs):
//!     Periodic timer
//!     → For each dead connection, compute timeout (backoff.rs)
//!     → Move back to active list once the timeout has elapsed
//! ```
//!
//! # Design Decisions
//! - No probing: a resurrected connection proves itself on the next request
//! - Backoff grows with the failure count and is capped
//! - Resurrector holds a weak reference; it never keeps a pool alive

pub mod backoff;
pub mod resurrector;
