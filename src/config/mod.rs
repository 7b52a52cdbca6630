//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! checkout.toml
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → CheckoutConfig (validated, immutable)
//!     → handed to the client, finalizer and orchestrator at startup
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so a minimal file (or none) is usable
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets (wallet key, auth token) never live in the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ApiConfig, BlockchainConfig, CheckoutConfig, ExternalCheckoutConfig, Network,
    ObservabilityConfig,
};
