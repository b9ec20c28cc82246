//! Reactor-driven dual-stack TCP server: one accept → write → close per event-loop run.

use std::process::ExitCode;

use tcp_demos::config::Program;
use tcp_demos::lifecycle::run_program;
use tcp_demos::service::ReactorServer;

fn main() -> ExitCode {
    run_program(Program::AsyncServer, ReactorServer::new)
}
