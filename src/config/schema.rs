//! Configuration schema definitions.
//!
//! This module defines the configuration shared by the demo programs.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// TCP port every listener binds and every client dials.
pub const DEFAULT_PORT: u16 = 20712;

/// Size of the client's single-read buffer.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Rotate the log file once it would grow past this many bytes.
pub const DEFAULT_ROTATION_SIZE: u64 = 10 * 1024 * 1024;

/// The programs shipped with this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    SyncServer,
    AsyncServer,
    SyncClient,
}

impl Program {
    /// Base name used for the program's log file.
    pub fn log_name(&self) -> &'static str {
        match self {
            Program::SyncServer => "sync_tcp_server",
            Program::AsyncServer => "async_tcp_server",
            Program::SyncClient => "sync_tcp_client",
        }
    }

    /// Line logged once logging is up, before the loops start.
    pub fn banner(&self) -> &'static str {
        match self {
            Program::SyncServer => "tcp sync server start.",
            Program::AsyncServer => "tcp async server start.",
            Program::SyncClient => "tcp sync client start.",
        }
    }
}

/// Root configuration for a service program.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Port to listen on (servers) or dial (client).
    pub port: u16,

    /// Whether servers keep one listener or bind a fresh one per connection.
    pub listener_policy: ListenerPolicy,

    /// Maximum bytes taken by one client read.
    pub read_buffer_size: usize,

    /// Client reconnect behaviour.
    pub retry: RetryConfig,

    /// Log sink settings.
    pub logging: LoggingConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            listener_policy: ListenerPolicy::Reuse,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Compile-time defaults for one of the shipped programs.
    pub fn for_program(program: Program) -> Self {
        let listener_policy = match program {
            Program::AsyncServer => ListenerPolicy::Recreate,
            Program::SyncServer | Program::SyncClient => ListenerPolicy::Reuse,
        };

        Self {
            listener_policy,
            logging: LoggingConfig {
                file_name: program.log_name().to_string(),
                ..LoggingConfig::default()
            },
            ..Self::default()
        }
    }
}

/// Listener lifetime across loop iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerPolicy {
    /// Bind once when the loop starts; a bind failure ends the loop.
    Reuse,
    /// Bind before every accept and drop the listener after the exchange.
    Recreate,
}

/// How the client spaces out reconnect attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryStrategy {
    /// Always wait `delay_ms`.
    Fixed,
    /// Double from `delay_ms` per consecutive failure, capped at `max_delay_ms`.
    Exponential,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    pub strategy: RetryStrategy,

    /// Delay after a failed attempt, in milliseconds.
    pub delay_ms: u64,

    /// Upper bound for the exponential strategy.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            strategy: RetryStrategy::Fixed,
            delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory holding the log files; created on startup.
    pub directory: String,

    /// File stem; the active file is `<directory>/<file_name>.log`.
    pub file_name: String,

    /// Size threshold for rotation.
    pub rotation_size_bytes: u64,

    /// Filter directive (trace, debug, info, warn, error).
    pub level: String,

    /// Mirror events to stdout.
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "./logs".to_string(),
            file_name: "tcp_demos".to_string(),
            rotation_size_bytes: DEFAULT_ROTATION_SIZE,
            level: "info".to_string(),
            console: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_defaults() {
        let sync = ServiceConfig::for_program(Program::SyncServer);
        assert_eq!(sync.port, DEFAULT_PORT);
        assert_eq!(sync.listener_policy, ListenerPolicy::Reuse);
        assert_eq!(sync.logging.file_name, "sync_tcp_server");

        let reactor = ServiceConfig::for_program(Program::AsyncServer);
        assert_eq!(reactor.listener_policy, ListenerPolicy::Recreate);
        assert_eq!(reactor.logging.file_name, "async_tcp_server");

        let client = ServiceConfig::for_program(Program::SyncClient);
        assert_eq!(client.read_buffer_size, 1024);
        assert_eq!(client.retry.delay_ms, 1000);
        assert_eq!(client.retry.strategy, RetryStrategy::Fixed);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            listener_policy = "recreate"

            [retry]
            delay_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.listener_policy, ListenerPolicy::Recreate);
        assert_eq!(config.retry.delay_ms, 250);
        assert_eq!(config.retry.max_delay_ms, 30_000);
        assert_eq!(config.logging.directory, "./logs");
    }
}
