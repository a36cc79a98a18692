//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the origin and quota proxy components from config
//! - Create the Axum Router for the enabled endpoints
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve on a listener until shutdown is signalled

use axum::{body::Body, http::Request, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::handlers;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::origin::{OriginConfig, OriginService};
use crate::proxy::{OriginUrlError, QuotaProxy};

/// HTTP server exposing the origin and/or quota proxy endpoints.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    origin: Option<Arc<OriginService>>,
    proxy: Option<Arc<QuotaProxy>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Components are only built for enabled endpoints, and routes are only
    /// mounted for components that exist.
    pub fn new(config: AppConfig) -> Result<Self, OriginUrlError> {
        let origin = config
            .endpoints
            .gpt0
            .then(|| Arc::new(OriginService::new(OriginConfig::from(&config.origin))));

        let proxy = if config.endpoints.limited {
            Some(Arc::new(QuotaProxy::from_settings(
                &config.proxy,
                &config.timeouts,
            )?))
        } else {
            None
        };

        let router = Self::build_router(&config, origin.clone(), proxy.clone());
        Ok(Self {
            router,
            config,
            origin,
            proxy,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &AppConfig,
        origin: Option<Arc<OriginService>>,
        proxy: Option<Arc<QuotaProxy>>,
    ) -> Router {
        let mut router = Router::new();

        if let Some(origin) = origin {
            router = router.merge(
                Router::new()
                    .route("/gpt0", get(handlers::gpt0))
                    .with_state(origin),
            );
        }

        if let Some(proxy) = proxy {
            router = router.merge(
                Router::new()
                    .route("/limited-gpt0", get(handlers::limited_gpt0))
                    .route("/quota", get(handlers::quota_status))
                    .with_state(proxy),
            );
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id(request.headers()),
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
    }

    /// Router with middleware, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            gpt0 = self.origin.is_some(),
            limited = self.proxy.is_some(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn origin(&self) -> Option<Arc<OriginService>> {
        self.origin.clone()
    }

    pub fn quota_proxy(&self) -> Option<Arc<QuotaProxy>> {
        self.proxy.clone()
    }
}
