//! Request execution over the connection pool.
//!
//! # Data Flow
//! ```text
//! perform(method, path, body)
//!     → pool.next() (select node)
//!     → reqwest request to node URL + path
//!     → network error: pool.remove(node), try next node
//!     → retryable status (502/503/504): try next node, node stays active
//!     → otherwise return the response
//! ```
//!
//! # Design Decisions
//! - Only network errors quarantine a node; a node that answers is alive
//! - Retries are bounded by `max_retries` and immediate
//! - Response bodies are not interpreted

pub mod client;

pub use client::{Transport, TransportError};
