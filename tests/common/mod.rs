//! Shared utilities for the service loop integration tests.

#![allow(dead_code)]

use std::io::Read;
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tcp_demos::config::{ListenerPolicy, ServiceConfig};
use tcp_demos::lifecycle::Shutdown;
use tcp_demos::observability::{EventSink, LogRecord, MemorySink};
use tcp_demos::service::ServiceContext;

/// Generous upper bound for anything that should happen "soon".
pub const PATIENCE: Duration = Duration::from_secs(5);

/// Config for a loop on `port` with a short retry delay.
pub fn test_config(port: u16, policy: ListenerPolicy, retry_ms: u64) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.port = port;
    config.listener_policy = policy;
    config.retry.delay_ms = retry_ms;
    config
}

/// A loop context that logs into `sink`.
pub fn context(config: ServiceConfig, sink: &Arc<MemorySink>, shutdown: &Shutdown) -> ServiceContext {
    let sink: Arc<dyn EventSink> = sink.clone();
    ServiceContext::new(config, sink, shutdown.clone())
}

/// Poll `check` until it holds or `timeout` passes.
pub fn wait_until<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    check()
}

/// Connect to a server loop, retrying while it is still binding.
pub fn connect(addr: SocketAddr) -> TcpStream {
    let deadline = Instant::now() + PATIENCE;
    loop {
        match TcpStream::connect(addr) {
            Ok(stream) => return stream,
            Err(_) if Instant::now() < deadline => std::thread::sleep(Duration::from_millis(20)),
            Err(e) => panic!("could not reach {addr}: {e}"),
        }
    }
}

/// Connect and read until the server closes.
pub fn fetch_greeting(addr: SocketAddr) -> String {
    let mut stream = connect(addr);
    let mut received = String::new();
    stream.read_to_string(&mut received).unwrap();
    received
}

/// Records whose message contains `needle`.
pub fn records_containing(sink: &MemorySink, needle: &str) -> Vec<LogRecord> {
    sink.records()
        .into_iter()
        .filter(|r| r.message.contains(needle))
        .collect()
}

/// Whether `::1` is usable on this host.
pub fn ipv6_loopback_available() -> bool {
    std::net::TcpListener::bind("[::1]:0").is_ok()
}
