//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (Ctrl+C) on a dedicated thread
//! - Translate it into a Shutdown trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe) on a current-thread runtime,
//!   so the service loops' own threads stay untouched

use std::io;
use std::thread::JoinHandle;

use crate::lifecycle::Shutdown;

/// Spawn a thread that triggers `shutdown` when Ctrl+C is received.
pub fn spawn_ctrl_c_handler(shutdown: Shutdown) -> io::Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("signal_thread".into())
        .spawn(move || {
            runtime.block_on(async {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => match result {
                        Ok(()) => {
                            tracing::info!("Shutdown signal received");
                            shutdown.trigger();
                        }
                        Err(e) => tracing::error!(error = %e, "Failed to install Ctrl+C handler"),
                    },
                    _ = shutdown.wait() => {}
                }
            });
        })
}
