//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Which endpoints this process serves.
    pub endpoints: EndpointsConfig,

    /// Origin service settings.
    pub origin: OriginSettings,

    /// Quota proxy settings.
    pub proxy: QuotaProxySettings,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port to bind.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Endpoint selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Serve `GET /gpt0`.
    pub gpt0: bool,

    /// Serve `GET /limited-gpt0` and `GET /quota`.
    pub limited: bool,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            gpt0: true,
            limited: true,
        }
    }
}

/// Origin service settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OriginSettings {
    /// Artificial delay before each response, in seconds.
    pub response_delay_secs: f64,
}

impl OriginSettings {
    /// Delay as a `Duration`. Invalid values collapse to zero; validation rejects them earlier.
    pub fn response_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.response_delay_secs).unwrap_or(Duration::ZERO)
    }
}

/// Quota proxy settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuotaProxySettings {
    /// Base URL of the origin service (e.g., "http://localhost:8000").
    pub origin_url: String,

    /// Cumulative byte budget for proxied responses.
    pub bandwidth_limit_bytes: u64,

    /// Largest origin body the proxy will buffer, in bytes.
    pub max_upstream_body_bytes: usize,
}

impl Default for QuotaProxySettings {
    fn default() -> Self {
        Self {
            origin_url: "http://localhost:8000".to_string(),
            bandwidth_limit_bytes: 1000,
            max_upstream_body_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout towards the origin, in seconds.
    pub connect_secs: u64,

    /// Deadline for a whole origin fetch (connect, headers, body), in seconds.
    /// Must stay below `request_secs` so a slow origin surfaces as 503.
    pub upstream_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 10,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
