//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc with the dispatcher and middleware
//! ```
//!
//! # Design Decisions
//! - Config is immutable for the life of the process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AuthConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, RestConfig, SecurityConfig,
    TimeoutConfig,
};
