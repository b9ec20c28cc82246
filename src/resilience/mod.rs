//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Client attempt fails (connect error, read error, end-of-stream):
//!     → socket closed
//!     → backoff.rs (RetryPolicy::on_failure → delay)
//!     → Shutdown::sleep(delay)
//! Client read succeeds:
//!     → RetryPolicy::on_success (no delay, attempt counter reset)
//! ```
//!
//! # Design Decisions
//! - Delay only after failure; success loops straight back to the socket
//! - No retry limit and no circuit breaker: the client retries forever
//! - Fixed delay by default; exponential growth is opt-in

pub mod backoff;

pub use backoff::{calculate_backoff, RetryPolicy};
