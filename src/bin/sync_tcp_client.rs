//! Blocking dual-stack TCP client: reads greetings and reconnects after a one-second pause on failure.

use std::process::ExitCode;

use tcp_demos::config::Program;
use tcp_demos::lifecycle::run_program;
use tcp_demos::service::SyncClient;

fn main() -> ExitCode {
    run_program(Program::SyncClient, SyncClient::new)
}
