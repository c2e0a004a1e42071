//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! LAM_PROXY_CONFIG (optional TOML file)
//!     → loader.rs (parse & deserialize, defaults when absent)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!
//! RACCOON_SECRET_KEY / .env
//!     → secret.rs (resolved once, or per request when configured)
//!     → SecretStore shared via Arc with the forwarding handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod secret;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    ListenerConfig, LimitsConfig, LoggingConfig, ProxyConfig, SecretConfig, UpstreamConfig,
};
pub use secret::{SecretError, SecretKey, SecretSource, SecretStore};
