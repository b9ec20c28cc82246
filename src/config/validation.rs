//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (buffer size, delays, rotation threshold)
//! - Check the log filter directive parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::{RetryStrategy, ServiceConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("read_buffer_size must be greater than zero")]
    ZeroReadBuffer,

    #[error("retry.delay_ms must be greater than zero")]
    ZeroRetryDelay,

    #[error("retry.max_delay_ms ({max}) is below retry.delay_ms ({base})")]
    MaxDelayBelowBase { base: u64, max: u64 },

    #[error("logging.rotation_size_bytes must be greater than zero")]
    ZeroRotationSize,

    #[error("logging.file_name must not be empty")]
    EmptyLogFileName,

    #[error("logging.level `{0}` is not a valid filter")]
    InvalidLogLevel(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.read_buffer_size == 0 {
        errors.push(ValidationError::ZeroReadBuffer);
    }

    if config.retry.delay_ms == 0 {
        errors.push(ValidationError::ZeroRetryDelay);
    }

    if config.retry.strategy == RetryStrategy::Exponential
        && config.retry.max_delay_ms < config.retry.delay_ms
    {
        errors.push(ValidationError::MaxDelayBelowBase {
            base: config.retry.delay_ms,
            max: config.retry.max_delay_ms,
        });
    }

    if config.logging.rotation_size_bytes == 0 {
        errors.push(ValidationError::ZeroRotationSize);
    }

    if config.logging.file_name.trim().is_empty() {
        errors.push(ValidationError::EmptyLogFileName);
    }

    if EnvFilter::try_new(&config.logging.level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(config.logging.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
