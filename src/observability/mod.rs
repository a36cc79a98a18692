//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and the quota proxy produce:
//!     → logging.rs (structured log events, request ID in every span)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
