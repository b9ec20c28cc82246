//! Retry delays for the reconnecting client.

use std::time::Duration;

use rand::Rng;

use crate::config::{RetryConfig, RetryStrategy};

/// Calculate exponential backoff delay with jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

/// Tracks consecutive failures and hands out the delay before the next attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    consecutive_failures: u32,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            consecutive_failures: 0,
        }
    }

    /// Record a failed attempt and return how long to wait before retrying.
    pub fn on_failure(&mut self) -> Duration {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.delay_for(self.consecutive_failures)
    }

    /// Record a successful read; the next failure starts from the base delay.
    pub fn on_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Delay for the given (1-based) consecutive failure.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.config.strategy {
            RetryStrategy::Fixed => Duration::from_millis(self.config.delay_ms),
            RetryStrategy::Exponential => {
                calculate_backoff(attempt, self.config.delay_ms, self.config.max_delay_ms)
            }
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
