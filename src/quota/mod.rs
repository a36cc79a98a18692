//! Bandwidth quota subsystem.
//!
//! # Data Flow
//! ```text
//! proxied response body
//!     → size in bytes
//!     → tracker.rs (atomic compare-and-swap on the remaining budget)
//!     → admitted (budget reduced) | rejected (budget untouched)
//! ```
//!
//! # Design Decisions
//! - One tracker per proxy process, owned by the proxy component
//! - No replenishment; the budget only resets on restart
//! - Lock-free: a CAS loop serializes concurrent consumers

pub mod error;
pub mod tracker;

pub use error::QuotaError;
pub use tracker::{QuotaSnapshot, QuotaTracker};
