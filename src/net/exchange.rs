//! The fixed unit of work performed per connection.
//!
//! Servers write one greeting and close; clients perform single reads and
//! log whatever arrives. There is no framing: a read may return any prefix
//! of what the peer sent.

use std::io::{self, Read};

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::net::connection::{Connection, Transport};
use crate::observability::EventSink;

/// Payload written by the blocking server.
pub const SYNC_SERVER_GREETING: &str = "hello from sync tcp server";

/// Payload written by the reactor-driven server.
pub const ASYNC_SERVER_GREETING: &str = "hello from async tcp server";

/// Result of the server-side write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Sent,
    Failed,
}

/// Result of one client-side read.
#[derive(Debug)]
pub enum ReadOutcome {
    /// This many bytes landed at the start of the buffer.
    Received(usize),
    /// The peer closed its side.
    EndOfStream,
    Failed(io::Error),
}

/// Write `payload` once, then close the connection whatever happened.
pub fn respond<S: Transport>(
    mut conn: Connection<S>,
    payload: &[u8],
    sink: &dyn EventSink,
) -> WriteOutcome {
    let id = conn.id();
    let written = conn
        .stream_mut()
        .write_all(payload)
        .and_then(|()| conn.stream_mut().flush());

    let outcome = match written {
        Ok(()) => {
            sink.info(&format!("send success ({id})"));
            WriteOutcome::Sent
        }
        Err(e) => {
            sink.error(&format!("write error ({id}): {e}"));
            WriteOutcome::Failed
        }
    };

    close(conn, sink);
    outcome
}

/// Close a blocking connection and log it.
pub fn close<S: Transport>(conn: Connection<S>, sink: &dyn EventSink) {
    let id = conn.id();
    if let Err(e) = conn.close() {
        // Peer may already have reset the socket.
        sink.debug(&format!("shutdown ({id}): {e}"));
    }
    sink.info(&format!("close a connection ({id})"));
}

/// Reactor counterpart of [`respond`]: write, then shut down, as two
/// sequential suspensions on the caller's event loop.
pub async fn respond_async<S>(
    mut conn: Connection<S>,
    payload: &[u8],
    sink: &dyn EventSink,
) -> WriteOutcome
where
    S: AsyncWrite + Unpin,
{
    let id = conn.id();
    let outcome = match conn.stream_mut().write_all(payload).await {
        Ok(()) => {
            sink.info(&format!("send success ({id})"));
            WriteOutcome::Sent
        }
        Err(e) => {
            sink.error(&format!("write error ({id}): {e}"));
            WriteOutcome::Failed
        }
    };

    if let Err(e) = conn.stream_mut().shutdown().await {
        sink.debug(&format!("shutdown ({id}): {e}"));
    }
    drop(conn);
    sink.info(&format!("close a connection ({id})"));

    outcome
}

/// Perform exactly one read into `buf`.
pub fn receive<S: Read>(stream: &mut S, buf: &mut [u8]) -> ReadOutcome {
    loop {
        match stream.read(buf) {
            Ok(0) => return ReadOutcome::EndOfStream,
            Ok(n) => return ReadOutcome::Received(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return ReadOutcome::Failed(e),
        }
    }
}
