//! Server loop ↔ client loop exchanges over IPv4 loopback.

use std::sync::Arc;

use tcp_demos::config::ListenerPolicy;
use tcp_demos::lifecycle::Shutdown;
use tcp_demos::observability::MemorySink;
use tcp_demos::service::{ReactorServer, Supervisor, SyncClient, SyncServer};

mod common;

#[test]
fn sync_server_greets_sync_client() {
    let port = 37101;
    let shutdown = Shutdown::new();
    let server_log = Arc::new(MemorySink::new());
    let client_log = Arc::new(MemorySink::new());

    let server_ctx = common::context(
        common::test_config(port, ListenerPolicy::Reuse, 50),
        &server_log,
        &shutdown,
    );
    let server = Supervisor::launch_versions(
        &[4],
        |raw| SyncServer::new(raw, server_ctx.for_loop()),
        server_log.clone(),
    );

    let client_ctx = common::context(
        common::test_config(port, ListenerPolicy::Reuse, 50),
        &client_log,
        &shutdown,
    );
    let client_tracker = client_ctx.tracker.clone();
    let client = Supervisor::launch_versions(
        &[4],
        |raw| SyncClient::new(raw, client_ctx.clone()),
        client_log.clone(),
    );

    assert!(
        common::wait_until(common::PATIENCE, || {
            client_log.count_containing("receive: hello from sync tcp server") >= 2
        }),
        "client never logged the greeting: {:?}",
        client_log.messages()
    );

    shutdown.trigger();
    for exit in client.join().into_iter().chain(server.join()) {
        assert!(exit.result.is_ok(), "{} failed: {:?}", exit.label, exit.result);
    }

    assert_eq!(client_tracker.active_count(), 0);
    assert!(client_tracker.peak_count() <= 1);
    assert!(server_log.count_containing("ipv4_thread accept a new connection") >= 2);
    assert!(server_log.count_containing("ipv4_thread send success") >= 2);
}

#[test]
fn reactor_server_greets_sync_client() {
    let port = 37102;
    let shutdown = Shutdown::new();
    let server_log = Arc::new(MemorySink::new());
    let client_log = Arc::new(MemorySink::new());

    let server_ctx = common::context(
        common::test_config(port, ListenerPolicy::Recreate, 50),
        &server_log,
        &shutdown,
    );
    let server_tracker = server_ctx.tracker.clone();
    let server = Supervisor::launch_versions(
        &[4],
        |raw| ReactorServer::new(raw, server_ctx.clone()),
        server_log.clone(),
    );

    let client_ctx = common::context(
        common::test_config(port, ListenerPolicy::Reuse, 50),
        &client_log,
        &shutdown,
    );
    let client = Supervisor::launch_versions(
        &[4],
        |raw| SyncClient::new(raw, client_ctx.clone()),
        client_log.clone(),
    );

    assert!(
        common::wait_until(common::PATIENCE, || {
            client_log.count_containing("receive: hello from async tcp server") >= 3
        }),
        "client never logged the greeting: {:?}",
        client_log.messages()
    );

    shutdown.trigger();
    for exit in client.join().into_iter().chain(server.join()) {
        assert!(exit.result.is_ok(), "{} failed: {:?}", exit.label, exit.result);
    }

    assert_eq!(server_tracker.active_count(), 0);
    assert_eq!(server_tracker.peak_count(), 1);
    assert_eq!(client_log.count_containing("read error"), 0);
    assert_eq!(
        server_log.count_containing("accept a new connection"),
        server_log.count_containing("close a connection")
    );
}
