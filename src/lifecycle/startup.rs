//! Startup orchestration shared by the service programs.
//!
//! # Responsibilities
//! - Initialize logging before anything else
//! - Install the Ctrl+C handler
//! - Launch the dual-stack supervisor and wait for it
//!
//! # Design Decisions
//! - Fail fast: a logging failure exits non-zero before any loop starts
//! - Once the loops are running, their errors are logged, never turned into an exit code

use std::process::ExitCode;
use std::sync::Arc;

use crate::config::{Program, ServiceConfig};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{init_logging, EventSink, TracingSink};
use crate::service::{ServiceContext, ServiceLoop, Supervisor};

/// Run `program` with its compile-time defaults until both loops end.
pub fn run_program<L, F>(program: Program, mut factory: F) -> ExitCode
where
    F: FnMut(u8, ServiceContext) -> L,
    L: ServiceLoop,
{
    let config = ServiceConfig::for_program(program);

    let handle = match init_logging(&config.logging) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("init log failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let sink: Arc<dyn EventSink> = Arc::new(TracingSink::new(handle));
    sink.info(program.banner());

    let shutdown = Shutdown::new();
    if let Err(e) = signals::spawn_ctrl_c_handler(shutdown.clone()) {
        sink.warn(&format!("Ctrl+C handler unavailable: {e}"));
    }

    let ctx = ServiceContext::new(config, Arc::clone(&sink), shutdown);
    let supervisor = Supervisor::launch(|raw| factory(raw, ctx.for_loop()), Arc::clone(&sink));
    supervisor.join();

    sink.info("Shutdown complete");
    sink.flush();
    ExitCode::SUCCESS
}
