//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Pool constructed → Shutdown created → resurrector subscribes
//! pool.close() or pool dropped → signal observed → resurrector exits
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
