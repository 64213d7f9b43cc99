//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use cluster_transport::Connection;

/// Start a mock node on an ephemeral port that answers every request
/// with `status` and `body`.
#[allow(dead_code)]
pub async fn start_mock_node(status: u16, body: &'static str) -> SocketAddr {
    start_programmable_node(move || async move { (status, body.to_string()) }).await
}

/// Start a mock node whose response is produced by `f` per request.
#[allow(dead_code)]
pub async fn start_programmable_node<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            504 => "504 Gateway Timeout",
                            _ => "500 Internal Server Error",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

#[allow(dead_code)]
pub fn connection(addr: SocketAddr) -> Arc<Connection> {
    Arc::new(Connection::new(Url::parse(&format!("http://{addr}")).unwrap()))
}

#[allow(dead_code)]
pub fn connections(n: usize) -> Vec<Arc<Connection>> {
    (0..n)
        .map(|i| Arc::new(Connection::new(Url::parse(&format!("http://10.0.0.{}:9200", i + 1)).unwrap())))
        .collect()
}
