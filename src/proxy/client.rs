//! HTTP client towards the origin service.

use std::error::Error as StdError;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, Method, Request, Uri},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use super::error::{OriginUrlError, ProxyError};
use crate::http::X_REQUEST_ID;

/// Path of the origin endpoint the proxy meters.
pub const ORIGIN_PATH: &str = "gpt0";

/// Single-attempt client for `GET {origin}/gpt0`.
#[derive(Clone)]
pub struct OriginClient {
    client: Client<HttpConnector, Body>,
    uri: Uri,
    upstream_timeout: Duration,
    max_body_bytes: usize,
}

impl OriginClient {
    pub fn new(
        origin_url: &str,
        connect_timeout: Duration,
        upstream_timeout: Duration,
        max_body_bytes: usize,
    ) -> Result<Self, OriginUrlError> {
        let uri = origin_uri(origin_url)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            uri,
            upstream_timeout,
            max_body_bytes,
        })
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Fetch the origin payload. Any failure, including a non-success status
    /// or missing the upstream deadline, is reported as `UpstreamUnavailable`.
    pub async fn fetch(&self, request_id: &str) -> Result<Bytes, ProxyError> {
        tokio::time::timeout(self.upstream_timeout, self.fetch_once(request_id))
            .await
            .map_err(|_| {
                ProxyError::UpstreamUnavailable(format!(
                    "origin did not respond within {:?}",
                    self.upstream_timeout
                ))
            })?
    }

    async fn fetch_once(&self, request_id: &str) -> Result<Bytes, ProxyError> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(self.uri.clone())
            .header(header::USER_AGENT, "bandwidth-proxy")
            .header(X_REQUEST_ID, request_id)
            .body(Body::empty())
            .map_err(|e| ProxyError::UpstreamUnavailable(describe(&e)))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ProxyError::UpstreamUnavailable(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::UpstreamUnavailable(format!(
                "origin responded with status {}",
                status
            )));
        }

        axum::body::to_bytes(Body::new(response.into_body()), self.max_body_bytes)
            .await
            .map_err(|e| ProxyError::UpstreamUnavailable(describe(&e)))
    }
}

/// Resolve `{base}/gpt0`, tolerating a trailing slash or a path prefix on the base.
pub fn origin_uri(origin_url: &str) -> Result<Uri, OriginUrlError> {
    let mut url = Url::parse(origin_url)?;
    url.path_segments_mut()
        .map_err(|_| OriginUrlError::CannotBeABase(origin_url.to_string()))?
        .pop_if_empty()
        .push(ORIGIN_PATH);
    Ok(url.as_str().parse::<Uri>()?)
}

/// Error message including its source chain; hyper's top-level messages are terse.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_uri_variants() {
        assert_eq!(
            origin_uri("http://localhost:8000").unwrap(),
            "http://localhost:8000/gpt0"
        );
        assert_eq!(
            origin_uri("http://localhost:8000/").unwrap(),
            "http://localhost:8000/gpt0"
        );
        assert_eq!(
            origin_uri("http://127.0.0.1:9000/api/").unwrap(),
            "http://127.0.0.1:9000/api/gpt0"
        );
    }

    #[test]
    fn test_origin_uri_rejects_garbage() {
        assert!(matches!(origin_uri("localhost"), Err(OriginUrlError::Parse(_))));
        assert!(matches!(
            origin_uri("mailto:someone@example.com"),
            Err(OriginUrlError::CannotBeABase(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_from_closed_port_is_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OriginClient::new(
            &format!("http://{}", addr),
            Duration::from_secs(1),
            Duration::from_secs(2),
            1024,
        )
        .unwrap();
        let err = client.fetch("test").await.unwrap_err();
        assert!(matches!(err, ProxyError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_origin_misses_upstream_deadline() {
        use axum::{routing::get, Router};

        let app = Router::new().route(
            "/gpt0",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                "hello world"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = OriginClient::new(
            &format!("http://{}", addr),
            Duration::from_secs(1),
            Duration::from_millis(50),
            1024,
        )
        .unwrap();
        match client.fetch("test").await {
            Err(ProxyError::UpstreamUnavailable(reason)) => {
                assert!(reason.contains("did not respond"), "unexpected reason: {}", reason)
            }
            other => panic!("expected UpstreamUnavailable, got {:?}", other.map(|b| b.len())),
        }
    }
}
