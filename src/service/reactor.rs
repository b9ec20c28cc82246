//! Reactor-driven server loop.
//!
//! Each iteration runs one accept → write → close sequence to completion on a
//! current-thread Tokio runtime owned by the loop's thread. The steps are
//! sequential suspensions, so nothing from one iteration is still pending when
//! the next begins.

use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

use crate::config::ListenerPolicy;
use crate::net::endpoint::loop_label;
use crate::net::exchange::{respond_async, ASYNC_SERVER_GREETING};
use crate::net::{AsyncListener, Connection, IpVersion};
use crate::observability::{EventSink, ScopedSink};
use crate::resilience::RetryPolicy;
use crate::service::{ServiceContext, ServiceError, ServiceLoop};

/// What the loop does after one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

/// Accepts one connection per iteration and greets it, without blocking calls.
pub struct ReactorServer {
    requested: u8,
    ctx: ServiceContext,
}

impl ReactorServer {
    /// `requested` is the raw IP version; anything but 4 or 6 means IPv4.
    pub fn new(requested: u8, ctx: ServiceContext) -> Self {
        Self { requested, ctx }
    }

    async fn serve_one(
        &self,
        version: IpVersion,
        persistent: Option<&AsyncListener>,
        retry: &mut RetryPolicy,
        log: &ScopedSink,
    ) -> Step {
        let fresh = match persistent {
            Some(_) => None,
            None => match AsyncListener::bind(version, self.ctx.config.port) {
                Ok(listener) => {
                    retry.on_success();
                    Some(listener)
                }
                Err(e) => {
                    log.error(&format!("bind error: {e}"));
                    let delay = retry.on_failure();
                    log.debug(&format!("retrying bind in {delay:?}"));
                    return self.pause(delay).await;
                }
            },
        };
        let Some(listener) = persistent.or(fresh.as_ref()) else {
            return Step::Continue;
        };

        let accepted = tokio::select! {
            accepted = listener.accept() => accepted,
            _ = self.ctx.shutdown.wait() => return Step::Stop,
        };
        // A per-iteration listener is closed before the peer is served.
        drop(fresh);

        let (stream, peer) = match accepted {
            Ok(accepted) => accepted,
            Err(e) => {
                log.error(&format!("accept error: {e}"));
                return Step::Continue;
            }
        };

        let conn = Connection::new(stream, peer, self.ctx.tracker.track());
        log.info(&format!("accept a new connection ({}) from {peer}", conn.id()));

        respond_async(conn, ASYNC_SERVER_GREETING.as_bytes(), log).await;
        Step::Continue
    }

    async fn pause(&self, delay: Duration) -> Step {
        tokio::select! {
            _ = tokio::time::sleep(delay) => Step::Continue,
            _ = self.ctx.shutdown.wait() => Step::Stop,
        }
    }
}

fn event_loop() -> Result<Runtime, ServiceError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ServiceError::Runtime)
}

impl ServiceLoop for ReactorServer {
    fn run(self) -> Result<(), ServiceError> {
        let log = ScopedSink::new(loop_label(self.requested), self.ctx.sink.clone());
        log.info("start.");

        let version = IpVersion::resolve(self.requested, &log);
        let runtime = event_loop()?;

        let persistent = match self.ctx.config.listener_policy {
            ListenerPolicy::Reuse => {
                let bound = {
                    let _entered = runtime.enter();
                    AsyncListener::bind(version, self.ctx.config.port)
                };
                match bound {
                    Ok(listener) => Some(listener),
                    Err(e) => {
                        log.error(&format!("bind error: {e}"));
                        return Err(e.into());
                    }
                }
            }
            ListenerPolicy::Recreate => None,
        };

        let mut retry = RetryPolicy::new(self.ctx.config.retry.clone());

        while !self.ctx.shutdown.is_triggered() {
            log.flush();

            let step =
                runtime.block_on(self.serve_one(version, persistent.as_ref(), &mut retry, &log));
            if step == Step::Stop {
                break;
            }
        }

        log.info("stop.");
        log.flush();
        Ok(())
    }
}
