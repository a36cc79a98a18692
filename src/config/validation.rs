//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, delay representable as a `Duration`)
//! - Keep the origin delay and upstream deadline inside the request timeout
//! - Check the origin URL is something the proxy client can reach
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("no endpoint enabled; enable gpt0, limited or both")]
    NoEndpoints,

    #[error("listener host must not be empty")]
    EmptyHost,

    #[error("invalid origin url {url:?}: {reason}")]
    InvalidOriginUrl { url: String, reason: String },

    #[error("response delay must be a finite, non-negative number of seconds (got {0})")]
    InvalidResponseDelay(f64),

    #[error(
        "response delay {delay_secs}s must be shorter than the request timeout ({request_secs}s)"
    )]
    DelayExceedsRequestTimeout { delay_secs: f64, request_secs: u64 },

    #[error("timeout {name} must be greater than zero")]
    ZeroTimeout { name: &'static str },

    #[error(
        "upstream timeout ({upstream_secs}s) must be shorter than the request timeout ({request_secs}s)"
    )]
    UpstreamExceedsRequestTimeout { upstream_secs: u64, request_secs: u64 },

    #[error("max upstream body size must be greater than zero")]
    ZeroUpstreamBody,

    #[error("invalid metrics address {0:?}")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.endpoints.gpt0 && !config.endpoints.limited {
        errors.push(ValidationError::NoEndpoints);
    }

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    let delay = config.origin.response_delay_secs;
    let request_secs = config.timeouts.request_secs;
    if Duration::try_from_secs_f64(delay).is_err() {
        errors.push(ValidationError::InvalidResponseDelay(delay));
    } else if config.endpoints.gpt0 && request_secs > 0 && delay >= request_secs as f64 {
        errors.push(ValidationError::DelayExceedsRequestTimeout {
            delay_secs: delay,
            request_secs,
        });
    }

    if config.endpoints.limited {
        if let Err(reason) = check_origin_url(&config.proxy.origin_url) {
            errors.push(ValidationError::InvalidOriginUrl {
                url: config.proxy.origin_url.clone(),
                reason,
            });
        }
        if config.proxy.max_upstream_body_bytes == 0 {
            errors.push(ValidationError::ZeroUpstreamBody);
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { name: "connect_secs" });
    }
    if request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { name: "request_secs" });
    }
    if config.endpoints.limited {
        let upstream_secs = config.timeouts.upstream_secs;
        if upstream_secs == 0 {
            errors.push(ValidationError::ZeroTimeout { name: "upstream_secs" });
        } else if request_secs > 0 && upstream_secs >= request_secs {
            errors.push(ValidationError::UpstreamExceedsRequestTimeout {
                upstream_secs,
                request_secs,
            });
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_origin_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme {:?}, only http is supported", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(())
}
