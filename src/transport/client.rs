//! HTTP transport backed by a connection pool.

use std::sync::Arc;
use reqwest::{Method, Response};
use thiserror::Error;
use url::Url;

use crate::config::TransportConfig;
use crate::observability::metrics;
use crate::pool::{ConnectionPool, PoolError};

/// Errors surfaced to callers of [`Transport::perform`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The pool had nothing to hand out.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// The last attempt failed at the network level.
    #[error("request to {node} failed: {source}")]
    Http {
        node: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

/// Executes requests against whichever node the pool selects.
#[derive(Debug, Clone)]
pub struct Transport {
    pool: Arc<dyn ConnectionPool>,
    client: reqwest::Client,
    max_retries: u32,
    retry_on_status: Vec<u16>,
}

impl Transport {
    pub fn new(pool: Arc<dyn ConnectionPool>, config: &TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            pool,
            client,
            max_retries: config.max_retries,
            retry_on_status: config.retry_on_status.clone(),
        })
    }

    pub fn pool(&self) -> &Arc<dyn ConnectionPool> {
        &self.pool
    }

    pub async fn get(&self, path: &str) -> Result<Response, TransportError> {
        self.perform(Method::GET, path, None).await
    }

    /// Send a request, failing over to other nodes on network errors and
    /// retryable statuses.
    pub async fn perform(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Response, TransportError> {
        let attempts = self.max_retries.saturating_add(1);

        for attempt in 1..=attempts {
            let conn = self.pool.next()?;
            let url = request_url(conn.url(), path);
            let node = conn.url().to_string();

            let mut request = self.client.request(method.clone(), url);
            if let Some(body) = &body {
                request = request.body(body.clone());
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if attempt < attempts && self.retry_on_status.contains(&status.as_u16()) {
                        tracing::warn!(node = %node, status = %status, attempt, "Retryable response status");
                        metrics::record_request(&node, "retry_status");
                        continue;
                    }
                    tracing::debug!(node = %node, status = %status, attempt, "Request complete");
                    metrics::record_request(&node, "response");
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(node = %node, attempt, error = %e, "Request failed, removing connection");
                    metrics::record_request(&node, "network_error");
                    self.pool.remove(&conn);
                    if attempt == attempts {
                        return Err(TransportError::Http { node, source: e });
                    }
                }
            }
        }

        // attempts >= 1 and the final attempt always returns
        Err(TransportError::Pool(PoolError::NoConnectionAvailable))
    }
}

/// Append `path` (optionally carrying a query) to the node URL's own path.
fn request_url(base: &Url, path: &str) -> Url {
    let (path, query) = match path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path, None),
    };

    let mut url = base.clone();
    let joined = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url.set_query(query);
    url
}
