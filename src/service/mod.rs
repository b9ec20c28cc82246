//! Per-version service loops and the dual-stack supervisor.
//!
//! # Data Flow
//! ```text
//! supervisor.rs
//!     → thread ipv4_thread ─┐
//!     → thread ipv6_thread ─┤ each runs one ServiceLoop:
//!                           ├─ sync_server.rs  (blocking accept → write → close)
//!                           ├─ reactor.rs      (same steps on a current-thread event loop)
//!                           └─ client.rs       (connect → read → backoff on failure)
//! ```
//!
//! # Design Decisions
//! - One OS thread per IP version; loops share nothing but the log sink
//! - Strictly one connection at a time per loop
//! - Transient I/O errors are handled inside the loop and never returned
//! - Only setup errors (bind under the reuse policy, runtime creation) end a loop

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::config::ServiceConfig;
use crate::lifecycle::Shutdown;
use crate::net::{ConnectionTracker, ListenerError};
use crate::observability::EventSink;

pub mod client;
pub mod reactor;
pub mod supervisor;
pub mod sync_server;

pub use client::SyncClient;
pub use reactor::ReactorServer;
pub use supervisor::{LoopExit, Supervisor, DUAL_STACK};
pub use sync_server::SyncServer;

/// Errors that end a service loop.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("failed to build event loop: {0}")]
    Runtime(#[source] io::Error),

    #[error("failed to spawn {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("{0} panicked")]
    Panicked(String),
}

/// A loop pinned to one IP version, run on its own thread until shutdown.
pub trait ServiceLoop: Send + 'static {
    /// Run until the shutdown signal fires or a setup error occurs.
    fn run(self) -> Result<(), ServiceError>;
}

/// What every loop is constructed with.
#[derive(Clone)]
pub struct ServiceContext {
    pub config: Arc<ServiceConfig>,
    pub sink: Arc<dyn EventSink>,
    pub shutdown: Shutdown,
    pub tracker: ConnectionTracker,
}

impl ServiceContext {
    pub fn new(config: ServiceConfig, sink: Arc<dyn EventSink>, shutdown: Shutdown) -> Self {
        Self {
            config: Arc::new(config),
            sink,
            shutdown,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Same config, sink and signal, but a tracker of its own.
    pub fn for_loop(&self) -> Self {
        Self {
            tracker: ConnectionTracker::new(),
            ..self.clone()
        }
    }
}
