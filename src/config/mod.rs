//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → command-line flags overlay (main.rs)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → split into per-component settings at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the quota budget only resets on restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AppConfig, EndpointsConfig, ListenerConfig, ObservabilityConfig, OriginSettings,
    QuotaProxySettings, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
