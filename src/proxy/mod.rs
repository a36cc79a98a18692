//! Quota proxy subsystem.
//!
//! # Data Flow
//! ```text
//! GET /limited-gpt0
//!     → client.rs (GET {origin}/gpt0, one attempt, upstream deadline)
//!         failure / non-2xx / deadline → 503, budget untouched
//!     → measure body size in bytes
//!     → quota::QuotaTracker::try_consume(size)
//!         overdraw → 429, budget untouched
//!     → 200 + origin body
//! ```

pub mod client;
pub mod error;

use std::time::{Duration, Instant};

use axum::body::Bytes;

pub use client::OriginClient;
pub use error::{OriginUrlError, ProxyError};

use crate::config::{QuotaProxySettings, TimeoutConfig};
use crate::observability::metrics;
use crate::quota::{QuotaSnapshot, QuotaTracker};

/// Meters origin responses against a byte budget it owns.
pub struct QuotaProxy {
    client: OriginClient,
    quota: QuotaTracker,
}

impl QuotaProxy {
    pub fn new(client: OriginClient, limit_bytes: u64) -> Self {
        metrics::record_quota_remaining(limit_bytes);
        Self {
            client,
            quota: QuotaTracker::new(limit_bytes),
        }
    }

    pub fn from_settings(
        settings: &QuotaProxySettings,
        timeouts: &TimeoutConfig,
    ) -> Result<Self, OriginUrlError> {
        let client = OriginClient::new(
            &settings.origin_url,
            Duration::from_secs(timeouts.connect_secs),
            Duration::from_secs(timeouts.upstream_secs),
            settings.max_upstream_body_bytes,
        )?;
        Ok(Self::new(client, settings.bandwidth_limit_bytes))
    }

    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    pub fn snapshot(&self) -> QuotaSnapshot {
        self.quota.snapshot()
    }

    /// Fetch the origin payload and charge its size to the budget.
    pub async fn proxy_fetch(&self, request_id: &str) -> Result<Bytes, ProxyError> {
        let start = Instant::now();
        let body = match self.client.fetch(request_id).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Origin fetch failed");
                metrics::record_proxy_outcome("upstream_unavailable");
                return Err(e);
            }
        };
        metrics::record_upstream_latency(start);

        let size_bytes = body.len() as u64;
        match self.quota.try_consume(size_bytes) {
            Ok(remaining_bytes) => {
                tracing::debug!(
                    request_id = %request_id,
                    size_bytes,
                    remaining_bytes,
                    "Response admitted"
                );
                metrics::record_proxy_outcome("admitted");
                // Read back from the tracker; concurrent admissions may finish out of order.
                metrics::record_quota_remaining(self.quota.remaining());
                Ok(body)
            }
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Bandwidth limit exceeded");
                metrics::record_proxy_outcome("quota_exceeded");
                Err(e.into())
            }
        }
    }
}
