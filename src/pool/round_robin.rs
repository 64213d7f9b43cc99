//! Round-robin pool with health tracking.
//!
//! # Responsibilities
//! - Rotate through active connections in insertion order
//! - Quarantine failed connections in a dead list ordered by failures
//! - Fall back to the least-failed dead connection when nothing is active
//! - Own the resurrector that brings dead connections back
//!
//! # Lock Order
//! Pool lock first, then at most one connection lock at a time. The dead
//! list is sorted on a copy of the failure counts so no connection lock is
//! held while comparing. Observers are notified before the pool lock is
//! released, so they see composition changes in the order they happened.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;

use crate::config::ResurrectionConfig;
use crate::health::backoff::resurrection_timeout;
use crate::health::resurrector::Resurrector;
use crate::lifecycle::Shutdown;
use crate::observability::observer::PoolObserver;
use crate::pool::{Connection, ConnectionPool, PoolError, PoolSnapshot};

/// Pool membership, guarded by the pool lock.
#[derive(Debug, Default)]
struct Members {
    active: Vec<Arc<Connection>>,
    /// Index of the next active connection to hand out.
    cursor: usize,
    /// Sorted by descending failure count.
    dead: Vec<Arc<Connection>>,
}

impl Members {
    fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot::capture(&self.active, &self.dead)
    }

    fn sort_dead(&mut self) {
        let mut keyed: Vec<(u32, Arc<Connection>)> = self
            .dead
            .drain(..)
            .map(|conn| (conn.failures(), conn))
            .collect();
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
        self.dead = keyed.into_iter().map(|(_, conn)| conn).collect();
    }

    fn remove_active(&mut self, conn: &Arc<Connection>) -> bool {
        let Some(index) = self.active.iter().position(|c| Arc::ptr_eq(c, conn)) else {
            return false;
        };
        self.active.remove(index);
        // Keep pointing at the connection that would have been next.
        if index < self.cursor {
            self.cursor -= 1;
        }
        if self.cursor >= self.active.len() {
            self.cursor = 0;
        }
        true
    }
}

/// Round-robin connection pool.
#[derive(Debug)]
pub struct RoundRobinPool {
    members: Mutex<Members>,
    config: ResurrectionConfig,
    observer: Option<Arc<dyn PoolObserver>>,
    shutdown: Shutdown,
}

impl RoundRobinPool {
    /// Create a pool with every connection active and start its resurrector.
    pub fn new(
        connections: Vec<Arc<Connection>>,
        config: ResurrectionConfig,
        observer: Option<Arc<dyn PoolObserver>>,
    ) -> Arc<Self> {
        let pool = Arc::new(Self {
            members: Mutex::new(Members {
                active: connections,
                ..Members::default()
            }),
            config,
            observer,
            shutdown: Shutdown::new(),
        });

        Resurrector::new(Arc::downgrade(&pool), pool.config.interval())
            .spawn(pool.shutdown.subscribe());

        {
            let members = pool.lock();
            tracing::debug!(nodes = members.active.len(), "Round-robin pool created");
            pool.notify(&members.snapshot());
        }
        pool
    }

    /// One resurrection pass as of `now`. Returns how many connections
    /// went back into rotation.
    pub fn resurrect(&self, now: Instant) -> usize {
        let initial = self.config.initial_timeout();
        let cutoff = self.config.timeout_factor_cutoff;

        let mut members = self.lock();
        let mut still_dead = Vec::with_capacity(members.dead.len());
        let mut resurrected = 0;

        for conn in std::mem::take(&mut members.dead) {
            let health = conn.health();
            let timeout = resurrection_timeout(health.failures, initial, cutoff);
            let eligible = match health.dead_since {
                Some(since) => since.checked_add(timeout).is_some_and(|deadline| now >= deadline),
                None => true,
            };

            tracing::trace!(
                node = %conn.url(),
                failures = health.failures,
                timeout_secs = timeout.as_secs(),
                eligible,
                "Evaluated dead connection"
            );

            if eligible {
                conn.mark_alive();
                tracing::info!(node = %conn.url(), failures = health.failures, "Resurrecting connection");
                members.active.push(conn);
                resurrected += 1;
            } else {
                still_dead.push(conn);
            }
        }
        members.dead = still_dead;

        if resurrected > 0 {
            self.notify(&members.snapshot());
        }
        resurrected
    }

    /// True while the background resurrector is still running.
    pub fn resurrector_running(&self) -> bool {
        self.shutdown.receiver_count() > 0
    }

    pub fn config(&self) -> &ResurrectionConfig {
        &self.config
    }

    /// Publish to the observer. Callers hold the pool lock.
    fn notify(&self, snapshot: &PoolSnapshot) {
        if let Some(observer) = &self.observer {
            observer.observe(snapshot);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Members> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConnectionPool for RoundRobinPool {
    fn next(&self) -> Result<Arc<Connection>, PoolError> {
        let conn = {
            let mut members = self.lock();

            if !members.active.is_empty() {
                if members.cursor >= members.active.len() {
                    members.cursor = 0;
                }
                let conn = members.active[members.cursor].clone();
                members.cursor = (members.cursor + 1) % members.active.len();
                return Ok(conn);
            }

            // Nothing active: hand out the least-failed dead connection
            // rather than refusing service. This skips the backoff schedule.
            let Some(conn) = members.dead.pop() else {
                return Err(PoolError::NoConnectionAvailable);
            };
            conn.mark_alive();
            members.active.push(conn.clone());
            members.cursor = 0;
            self.notify(&members.snapshot());
            conn
        };

        tracing::warn!(
            node = %conn.url(),
            failures = conn.failures(),
            "No active connections, forcing resurrection of least-failed connection"
        );
        Ok(conn)
    }

    fn remove(&self, conn: &Arc<Connection>) {
        let snapshot = {
            let mut members = self.lock();
            // Marked under the pool lock so the dead flag and membership
            // change together with respect to next() and the resurrector.
            conn.mark_dead(Instant::now());

            if !members.dead.iter().any(|c| Arc::ptr_eq(c, conn)) {
                members.dead.push(conn.clone());
            }
            members.sort_dead();

            if !members.remove_active(conn) {
                tracing::debug!(node = %conn.url(), "Connection already removed from active list");
            }
            let snapshot = members.snapshot();
            self.notify(&snapshot);
            snapshot
        };

        tracing::warn!(
            node = %conn.url(),
            failures = conn.failures(),
            active = snapshot.active.len(),
            dead = snapshot.dead.len(),
            "Connection marked dead"
        );
    }

    fn snapshot(&self) -> PoolSnapshot {
        self.lock().snapshot()
    }

    fn close(&self) {
        if self.shutdown.trigger() {
            tracing::debug!("Round-robin pool closed");
        }
    }
}
