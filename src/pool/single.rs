//! Single-node pool.

use std::sync::Arc;
use crate::pool::{Connection, ConnectionPool, PoolError, PoolSnapshot};

/// Pool over exactly one node. No health tracking.
#[derive(Debug)]
pub struct SinglePool {
    connection: Arc<Connection>,
}

impl SinglePool {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }
}

impl ConnectionPool for SinglePool {
    fn next(&self) -> Result<Arc<Connection>, PoolError> {
        Ok(self.connection.clone())
    }

    fn remove(&self, _conn: &Arc<Connection>) {}

    fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot::capture(std::slice::from_ref(&self.connection), &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_single_always_same() {
        let c = Arc::new(Connection::new(Url::parse("http://localhost:9200").unwrap()));
        let pool = SinglePool::new(c.clone());

        for _ in 0..3 {
            assert!(Arc::ptr_eq(&pool.next().unwrap(), &c));
        }
        pool.remove(&c);
        assert!(Arc::ptr_eq(&pool.next().unwrap(), &c));
        assert_eq!(c.failures(), 0);
        assert_eq!(pool.snapshot().active.len(), 1);
    }
}
