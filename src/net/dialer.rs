//! Client-side endpoint.

use std::io;
use std::net::{SocketAddr, TcpStream};

use crate::net::endpoint::IpVersion;

/// Produces one connected stream per successful connect attempt.
#[derive(Debug, Clone, Copy)]
pub struct Dialer {
    target: SocketAddr,
}

impl Dialer {
    /// Dial the loopback address of `version` on `port`.
    pub fn new(version: IpVersion, port: u16) -> Self {
        Self {
            target: version.loopback_addr(port),
        }
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Connect, blocking until the handshake completes or fails.
    pub fn connect(&self) -> io::Result<TcpStream> {
        TcpStream::connect(self.target)
    }
}
