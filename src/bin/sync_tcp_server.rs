//! Blocking dual-stack TCP server: greets each connection once, then closes it.

use std::process::ExitCode;

use tcp_demos::config::Program;
use tcp_demos::lifecycle::run_program;
use tcp_demos::service::SyncServer;

fn main() -> ExitCode {
    run_program(Program::SyncServer, SyncServer::new)
}
