//! Blocking server loop.

use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::config::ListenerPolicy;
use crate::net::endpoint::loop_label;
use crate::net::exchange::{respond, SYNC_SERVER_GREETING};
use crate::net::{Connection, IpVersion, Listener};
use crate::observability::{EventSink, ScopedSink};
use crate::resilience::RetryPolicy;
use crate::service::{ServiceContext, ServiceError, ServiceLoop};

/// How long a wake-up connect may take before it is abandoned.
const WAKE_TIMEOUT: Duration = Duration::from_millis(250);

/// Accepts one connection at a time, greets it and closes it.
pub struct SyncServer {
    requested: u8,
    ctx: ServiceContext,
}

impl SyncServer {
    /// `requested` is the raw IP version; anything but 4 or 6 means IPv4.
    pub fn new(requested: u8, ctx: ServiceContext) -> Self {
        Self { requested, ctx }
    }

    /// Bind for this iteration under the recreate policy.
    ///
    /// Returns `None` when the loop should go round again (or stop).
    fn bind_fresh(
        &self,
        version: IpVersion,
        retry: &mut RetryPolicy,
        log: &ScopedSink,
    ) -> Option<Listener> {
        match Listener::bind(version, self.ctx.config.port) {
            Ok(listener) => {
                retry.on_success();
                Some(listener)
            }
            Err(e) => {
                log.error(&format!("bind error: {e}"));
                let delay = retry.on_failure();
                log.debug(&format!("retrying bind in {delay:?}"));
                self.ctx.shutdown.sleep(delay);
                None
            }
        }
    }
}

impl ServiceLoop for SyncServer {
    fn run(self) -> Result<(), ServiceError> {
        let log = ScopedSink::new(loop_label(self.requested), self.ctx.sink.clone());
        log.info("start.");

        let version = IpVersion::resolve(self.requested, &log);
        let config = &self.ctx.config;
        let shutdown = &self.ctx.shutdown;

        let persistent = match config.listener_policy {
            ListenerPolicy::Reuse => match Listener::bind(version, config.port) {
                Ok(listener) => Some(listener),
                Err(e) => {
                    log.error(&format!("bind error: {e}"));
                    return Err(e.into());
                }
            },
            ListenerPolicy::Recreate => None,
        };

        let wake = persistent
            .as_ref()
            .map(Listener::wake_addr)
            .unwrap_or_else(|| version.loopback_addr(config.port));
        shutdown.on_trigger(move || wake_listener(wake));

        let mut retry = RetryPolicy::new(config.retry.clone());
        let greeting = SYNC_SERVER_GREETING.as_bytes();

        while !shutdown.is_triggered() {
            log.flush();

            let mut fresh = None;
            if persistent.is_none() {
                match self.bind_fresh(version, &mut retry, &log) {
                    Some(listener) => fresh = Some(listener),
                    None => continue,
                }
            }
            let Some(listener) = persistent.as_ref().or(fresh.as_ref()) else {
                continue;
            };

            // A trigger that fired before the bind could not reach this listener.
            if shutdown.is_triggered() {
                break;
            }

            let accepted = listener.accept();
            // A per-iteration listener is closed before the peer is served, so
            // a peer reconnecting meanwhile is refused rather than queued.
            drop(fresh);

            let (stream, peer) = match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    log.error(&format!("accept error: {e}"));
                    continue;
                }
            };

            if shutdown.is_triggered() {
                // The wake-up connection, or a peer that raced it.
                drop(stream);
                break;
            }

            let conn = Connection::new(stream, peer, self.ctx.tracker.track());
            log.info(&format!("accept a new connection ({}) from {peer}", conn.id()));

            respond(conn, greeting, &log);
        }

        log.info("stop.");
        log.flush();
        Ok(())
    }
}

/// Unblock an `accept` on `addr` by connecting to it.
fn wake_listener(addr: SocketAddr) {
    if let Err(e) = TcpStream::connect_timeout(&addr, WAKE_TIMEOUT) {
        tracing::debug!(address = %addr, error = %e, "Wake-up connect failed");
    }
}
