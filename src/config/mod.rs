//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! compile-time defaults (ServiceConfig::for_program)
//!   or config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → shared via Arc with both service loops
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - The shipped programs never read a file; the port stays the compile-time constant

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ListenerPolicy, LoggingConfig, Program, RetryConfig, RetryStrategy, ServiceConfig,
    DEFAULT_PORT,
};
pub use validation::{validate_config, ValidationError};
