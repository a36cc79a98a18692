//! Bandwidth-metered proxy in front of a fixed-payload origin.
//!
//! ```text
//!   client ──▶ /limited-gpt0 ──▶ QuotaProxy ──GET /gpt0──▶ OriginService
//!                                   │  measure body size
//!                                   ▼
//!                             QuotaTracker (atomic byte budget)
//!                                   │
//!   client ◀── 200 body | 429 exhausted | 503 origin down
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod origin;
pub mod proxy;
pub mod quota;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use origin::{OriginService, ORIGIN_PAYLOAD};
pub use proxy::{ProxyError, QuotaProxy};
pub use quota::QuotaTracker;
