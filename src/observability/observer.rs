//! Pool composition observers.

use std::fmt;
use tokio::sync::mpsc;

use crate::observability::metrics;
use crate::pool::PoolSnapshot;

/// Receives a snapshot every time a pool's composition changes.
///
/// Called with the pool lock held, from whichever thread changed the pool,
/// so snapshots arrive in the order the changes happened. Implementations
/// must return promptly and must not call back into the pool.
pub trait PoolObserver: Send + Sync + fmt::Debug {
    fn observe(&self, snapshot: &PoolSnapshot);
}

/// Forwards snapshots into a bounded channel, dropping them when it is full.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::Sender<PoolSnapshot>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<PoolSnapshot>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl PoolObserver for ChannelObserver {
    fn observe(&self, snapshot: &PoolSnapshot) {
        match self.tx.try_send(snapshot.clone()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!("Observer channel full, dropping pool snapshot");
                metrics::record_observer_dropped();
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                metrics::record_observer_dropped();
            }
        }
    }
}

/// Publishes pool composition as metrics gauges.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObserver;

impl PoolObserver for MetricsObserver {
    fn observe(&self, snapshot: &PoolSnapshot) {
        metrics::record_pool_snapshot(snapshot);
    }
}

/// Fans a snapshot out to several observers.
#[derive(Debug, Default)]
pub struct CompositeObserver {
    observers: Vec<std::sync::Arc<dyn PoolObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<std::sync::Arc<dyn PoolObserver>>) -> Self {
        Self { observers }
    }
}

impl PoolObserver for CompositeObserver {
    fn observe(&self, snapshot: &PoolSnapshot) {
        for observer in &self.observers {
            observer.observe(snapshot);
        }
    }
}
