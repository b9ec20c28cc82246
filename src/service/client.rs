//! Blocking client loop with reconnect backoff.
//!
//! # State Machine
//! ```text
//! Disconnected ──connect ok──▶ Connected ──read ok──▶ Connected (no delay)
//!      ▲  │                        │
//!      │  └─connect err─▶ sleep ◀──┴─ end-of-stream / read err (close first)
//!      └──────────────────────┘
//! ```

use std::net::{Shutdown as SocketShutdown, TcpStream};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::net::endpoint::loop_label;
use crate::net::exchange::{self, receive, ReadOutcome};
use crate::net::{Connection, Dialer, IpVersion};
use crate::observability::{EventSink, ScopedSink};
use crate::resilience::RetryPolicy;
use crate::service::{ServiceContext, ServiceError, ServiceLoop};

/// Clone of the open stream, kept so a shutdown can interrupt a blocked read.
type WakeSlot = Arc<Mutex<Option<TcpStream>>>;

/// Connects to the local server and logs every payload it reads.
pub struct SyncClient {
    requested: u8,
    ctx: ServiceContext,
}

impl SyncClient {
    /// `requested` is the raw IP version; anything but 4 or 6 means IPv4.
    pub fn new(requested: u8, ctx: ServiceContext) -> Self {
        Self { requested, ctx }
    }

    /// Wait out the retry delay. Returns `true` if the loop should stop.
    fn back_off(&self, retry: &mut RetryPolicy, log: &ScopedSink) -> bool {
        let delay = retry.on_failure();
        log.debug(&format!("retrying in {delay:?}"));
        self.ctx.shutdown.sleep(delay)
    }

    fn disconnect(
        &self,
        current: &mut Option<Connection<TcpStream>>,
        slot: &WakeSlot,
        log: &ScopedSink,
    ) {
        slot.lock().take();
        if let Some(conn) = current.take() {
            exchange::close(conn, log);
        }
    }
}

impl ServiceLoop for SyncClient {
    fn run(self) -> Result<(), ServiceError> {
        let log = ScopedSink::new(loop_label(self.requested), self.ctx.sink.clone());
        log.info("start.");

        let version = IpVersion::resolve(self.requested, &log);
        let dialer = Dialer::new(version, self.ctx.config.port);
        let shutdown = &self.ctx.shutdown;

        let slot: WakeSlot = Arc::new(Mutex::new(None));
        let hook_slot = Arc::clone(&slot);
        shutdown.on_trigger(move || {
            if let Some(stream) = hook_slot.lock().as_ref() {
                let _ = stream.shutdown(SocketShutdown::Both);
            }
        });

        let mut retry = RetryPolicy::new(self.ctx.config.retry.clone());
        let mut buf = vec![0u8; self.ctx.config.read_buffer_size];
        let mut current: Option<Connection<TcpStream>> = None;

        while !shutdown.is_triggered() {
            log.flush();

            if current.is_none() {
                let stream = match dialer.connect() {
                    Ok(stream) => stream,
                    Err(e) => {
                        log.error(&format!("connect error: {e}"));
                        if self.back_off(&mut retry, &log) {
                            break;
                        }
                        continue;
                    }
                };

                *slot.lock() = stream.try_clone().ok();
                let peer = stream.peer_addr().unwrap_or_else(|_| dialer.target());
                let conn = Connection::new(stream, peer, self.ctx.tracker.track());
                log.info(&format!("connect success ({}).", conn.id()));
                current = Some(conn);
            }

            // A trigger that fired before the slot was filled could not reach this stream.
            if shutdown.is_triggered() {
                break;
            }

            let Some(conn) = current.as_mut() else {
                continue;
            };

            match receive(conn.stream_mut(), &mut buf) {
                ReadOutcome::Received(n) => {
                    retry.on_success();
                    log.info(&format!("receive: {}", String::from_utf8_lossy(&buf[..n])));
                }
                ReadOutcome::EndOfStream => {
                    log.info("connection closed.");
                    self.disconnect(&mut current, &slot, &log);
                    if self.back_off(&mut retry, &log) {
                        break;
                    }
                }
                ReadOutcome::Failed(e) => {
                    log.error(&format!("read error: {e}"));
                    self.disconnect(&mut current, &slot, &log);
                    log.info("connection closed.");
                    if self.back_off(&mut retry, &log) {
                        break;
                    }
                }
            }
        }

        self.disconnect(&mut current, &slot, &log);
        log.info("stop.");
        log.flush();
        Ok(())
    }
}
