//! Background resurrection of dead connections.
//!
//! # Responsibilities
//! - Wake on a fixed interval
//! - Ask the owning pool to promote connections whose backoff elapsed
//! - Exit on shutdown signal or once the pool is dropped

use std::sync::Weak;
use std::time::Duration;
use tokio::runtime::{self, Handle};
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::pool::RoundRobinPool;

pub struct Resurrector {
    pool: Weak<RoundRobinPool>,
    interval: Duration,
}

impl Resurrector {
    pub fn new(pool: Weak<RoundRobinPool>, interval: Duration) -> Self {
        Self { pool, interval }
    }

    /// Start the loop on the current tokio runtime, or on a dedicated
    /// thread when called outside of one.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) {
        if let Ok(handle) = Handle::try_current() {
            handle.spawn(self.run(shutdown));
            return;
        }

        let spawned = std::thread::Builder::new()
            .name("pool-resurrector".to_string())
            .spawn(move || {
                match runtime::Builder::new_current_thread().enable_time().build() {
                    Ok(rt) => rt.block_on(self.run(shutdown)),
                    Err(e) => tracing::error!(error = %e, "Failed to build resurrector runtime"),
                }
            });
        if let Err(e) = spawned {
            tracing::error!(error = %e, "Failed to spawn resurrector thread");
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            "Resurrector starting"
        );

        let now = Instant::now();
        let start = now.checked_add(self.interval).unwrap_or(now);
        let mut ticker = time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(pool) = self.pool.upgrade() else {
                        tracing::debug!("Pool dropped, resurrector exiting");
                        break;
                    };
                    let resurrected = pool.resurrect(Instant::now());
                    if resurrected > 0 {
                        tracing::debug!(resurrected, "Resurrection pass complete");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Resurrector received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use url::Url;

    use super::Resurrector;
    use crate::config::ResurrectionConfig;
    use crate::lifecycle::Shutdown;
    use crate::pool::{Connection, ConnectionPool, RoundRobinPool};

    fn conns(n: usize) -> Vec<Arc<Connection>> {
        (0..n)
            .map(|i| {
                let url = Url::parse(&format!("http://127.0.0.1:{}", 9300 + i)).unwrap();
                Arc::new(Connection::new(url))
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_resurrects_after_timeout() {
        let cs = conns(2);
        let pool = RoundRobinPool::new(cs.clone(), ResurrectionConfig::default(), None);

        pool.remove(&cs[0]);

        tokio::time::sleep(Duration::from_secs(56)).await;
        assert!(cs[0].is_dead(), "resurrected before initial timeout");

        // first tick at or after 60s promotes it
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!cs[0].is_dead());
        assert_eq!(pool.snapshot().active.len(), 2);
        pool.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_failures_wait_longer() {
        let cs = conns(2);
        let pool = RoundRobinPool::new(cs.clone(), ResurrectionConfig::default(), None);

        pool.remove(&cs[0]);
        pool.remove(&cs[0]);
        pool.remove(&cs[0]);

        // 3 failures → 240s
        tokio::time::sleep(Duration::from_secs(236)).await;
        assert!(cs[0].is_dead());
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!cs[0].is_dead());
        pool.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_config() {
        let cs = conns(2);
        let config = ResurrectionConfig {
            interval_secs: 1,
            initial_timeout_secs: 2,
            timeout_factor_cutoff: 1,
        };
        let pool = RoundRobinPool::new(cs.clone(), config, None);

        for _ in 0..4 {
            pool.remove(&cs[1]);
        }
        // capped at 2s * 2^1
        tokio::time::sleep(Duration::from_millis(4_500)).await;
        assert!(!cs[1].is_dead());
        pool.close();
    }

    #[tokio::test]
    async fn test_stops_on_close() {
        let pool = RoundRobinPool::new(conns(2), ResurrectionConfig::default(), None);
        assert!(pool.resurrector_running());

        pool.close();
        for _ in 0..100 {
            if !pool.resurrector_running() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("resurrector still running after close");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exits_when_pool_dropped() {
        let pool = RoundRobinPool::new(conns(2), ResurrectionConfig::default(), None);
        // keep our own shutdown alive so only the dropped pool can end the loop
        let shutdown = Shutdown::new();
        let task = tokio::spawn(
            Resurrector::new(Arc::downgrade(&pool), Duration::from_secs(1)).run(shutdown.subscribe()),
        );

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert!(!task.is_finished());

        drop(pool);
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("resurrector still running after pool drop")
            .unwrap();
        assert_eq!(shutdown.receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_huge_interval_does_not_kill_resurrector() {
        let config = ResurrectionConfig {
            interval_secs: u64::MAX,
            ..ResurrectionConfig::default()
        };
        let pool = RoundRobinPool::new(conns(2), config, None);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(pool.resurrector_running());
        pool.close();
    }
}
