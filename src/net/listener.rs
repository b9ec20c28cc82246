//! TCP listener implementation for one address family.
//!
//! # Responsibilities
//! - Bind the wildcard address of one IP version on the service port
//! - Accept incoming TCP connections, blocking or reactor-driven
//! - Provide the loopback address used to wake a blocked accept

use std::io;
use std::net::{SocketAddr, TcpListener as StdTcpListener, TcpStream};

use socket2::{Protocol, Socket, Type};
use thiserror::Error;

use crate::net::endpoint::IpVersion;

/// Pending connections queued by the kernel per listener.
const BACKLOG: i32 = 128;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(#[source] io::Error),
}

/// Create a listening std socket for `version` on `port`.
fn bind_socket(version: IpVersion, port: u16) -> Result<StdTcpListener, ListenerError> {
    let addr = version.listen_addr(port);
    let bind_err = |source| ListenerError::Bind { addr, source };

    let socket = Socket::new(version.domain(), Type::STREAM, Some(Protocol::TCP)).map_err(bind_err)?;
    if version == IpVersion::V6 {
        socket.set_only_v6(true).map_err(bind_err)?;
    }
    #[cfg(unix)]
    socket.set_reuse_address(true).map_err(bind_err)?;

    socket.bind(&addr.into()).map_err(bind_err)?;
    socket.listen(BACKLOG).map_err(bind_err)?;

    Ok(socket.into())
}

/// A blocking listener owned by one service loop.
#[derive(Debug)]
pub struct Listener {
    /// The underlying TCP listener.
    inner: StdTcpListener,
    version: IpVersion,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind the wildcard address of `version`.
    pub fn bind(version: IpVersion, port: u16) -> Result<Self, ListenerError> {
        let inner = bind_socket(version, port)?;
        let local_addr = inner.local_addr().map_err(|source| ListenerError::Bind {
            addr: version.listen_addr(port),
            source,
        })?;

        tracing::debug!(address = %local_addr, "Listener bound");

        Ok(Self {
            inner,
            version,
            local_addr,
        })
    }

    /// Block until a peer connects.
    pub fn accept(&self) -> Result<(TcpStream, SocketAddr), ListenerError> {
        self.inner.accept().map_err(ListenerError::Accept)
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Loopback address that reaches this listener.
    pub fn wake_addr(&self) -> SocketAddr {
        self.version.loopback_addr(self.local_addr.port())
    }
}

/// A listener registered with the current thread's event loop.
///
/// Must be created from inside a Tokio runtime context.
#[derive(Debug)]
pub struct AsyncListener {
    inner: tokio::net::TcpListener,
    local_addr: SocketAddr,
}

impl AsyncListener {
    /// Bind the wildcard address of `version` and hand it to the reactor.
    pub fn bind(version: IpVersion, port: u16) -> Result<Self, ListenerError> {
        let addr = version.listen_addr(port);
        let bind_err = |source| ListenerError::Bind { addr, source };

        let std_listener = bind_socket(version, port)?;
        std_listener.set_nonblocking(true).map_err(bind_err)?;
        let inner = tokio::net::TcpListener::from_std(std_listener).map_err(bind_err)?;
        let local_addr = inner.local_addr().map_err(bind_err)?;

        tracing::debug!(address = %local_addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    /// Suspend until a peer connects.
    pub async fn accept(&self) -> Result<(tokio::net::TcpStream, SocketAddr), ListenerError> {
        self.inner.accept().await.map_err(ListenerError::Accept)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}
