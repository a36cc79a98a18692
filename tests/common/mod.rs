//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bandwidth_proxy::config::AppConfig;
use bandwidth_proxy::lifecycle::Shutdown;
use bandwidth_proxy::{HttpServer, QuotaProxy};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A server running on an ephemeral port; shut down on drop.
pub struct RunningServer {
    pub url: String,
    pub proxy: Option<Arc<QuotaProxy>>,
    shutdown: Shutdown,
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Bind a fresh loopback listener.
pub async fn bind_local() -> TcpListener {
    TcpListener::bind("127.0.0.1:0").await.unwrap()
}

/// Serve `config` on an already-bound listener.
pub fn start_server_on(listener: TcpListener, config: AppConfig) -> RunningServer {
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    let proxy = server.quota_proxy();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningServer {
        url: format!("http://{}", addr),
        proxy,
        shutdown,
    }
}

/// Start a server that only serves `/gpt0`.
pub async fn start_origin(response_delay_secs: f64) -> RunningServer {
    let mut config = AppConfig::default();
    config.endpoints.limited = false;
    config.origin.response_delay_secs = response_delay_secs;
    start_server_on(bind_local().await, config)
}

/// Start a server that only serves `/limited-gpt0` and `/quota`.
pub async fn start_limited(origin_url: &str, bandwidth_limit_bytes: u64) -> RunningServer {
    let mut config = AppConfig::default();
    config.endpoints.gpt0 = false;
    config.proxy.origin_url = origin_url.to_string();
    config.proxy.bandwidth_limit_bytes = bandwidth_limit_bytes;
    config.timeouts.connect_secs = 1;
    start_server_on(bind_local().await, config)
}

/// URL of a loopback port that nothing listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Start a raw HTTP/1.1 backend whose status and body come from `f`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = bind_local().await;
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let (status, body) = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    502 => "502 Bad Gateway",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}
