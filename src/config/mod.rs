//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, all errors collected)
//!     → MonitorConfig (validated, immutable)
//!     → shared read-only with every subsystem
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; each run is a fresh pass over it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AlertingConfig, DiscoveryConfig, FetchConfig, MonitorConfig, ObservabilityConfig, ProbeConfig,
    WorkerConfig,
};
pub use validation::{validate_config, ValidationError};
