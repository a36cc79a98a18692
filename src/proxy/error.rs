//! Quota proxy errors and their HTTP mapping.

use axum::{
    http::{uri::InvalidUri, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::quota::QuotaError;

/// Failure of a single proxied request. Every variant is terminal for that request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Origin unreachable, or it answered with a non-success status.
    #[error("Failed to fetch from GPT0: {0}")]
    UpstreamUnavailable(String),

    /// The response would overdraw the bandwidth budget.
    #[error("Bandwidth limit exceeded")]
    QuotaExceeded(#[from] QuotaError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// The configured origin base URL cannot address `/gpt0`.
#[derive(Debug, Error)]
pub enum OriginUrlError {
    #[error("invalid origin url: {0}")]
    Parse(#[from] url::ParseError),

    #[error("origin url {0:?} cannot carry a path")]
    CannotBeABase(String),

    #[error("origin url is not a valid request uri: {0}")]
    Uri(#[from] InvalidUri),
}
