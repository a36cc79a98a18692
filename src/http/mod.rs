//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (add request ID)
//!     → handlers.rs
//!         /gpt0         → origin::OriginService
//!         /limited-gpt0 → proxy::QuotaProxy
//!         /quota        → proxy::QuotaProxy (read-only snapshot)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
