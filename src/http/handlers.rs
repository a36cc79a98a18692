//! Endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};

use crate::http::request::request_id;
use crate::origin::OriginService;
use crate::proxy::{ProxyError, QuotaProxy};
use crate::quota::QuotaSnapshot;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// `GET /gpt0`
pub async fn gpt0(State(origin): State<Arc<OriginService>>) -> Response {
    origin.fetch().await.into_response()
}

/// `GET /limited-gpt0`
pub async fn limited_gpt0(
    State(proxy): State<Arc<QuotaProxy>>,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let request_id = request_id(&headers);
    let body = proxy.proxy_fetch(&request_id).await?;
    Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response())
}

/// `GET /quota`
pub async fn quota_status(State(proxy): State<Arc<QuotaProxy>>) -> Json<QuotaSnapshot> {
    Json(proxy.snapshot())
}
