//! Address family selection for one service loop.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use socket2::Domain;
use thiserror::Error;

use crate::observability::EventSink;

/// IP version a service loop is pinned to for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

/// Raised for anything other than 4 or 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid ip version: {0}")]
pub struct InvalidIpVersion(pub u8);

impl TryFrom<u8> for IpVersion {
    type Error = InvalidIpVersion;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            4 => Ok(IpVersion::V4),
            6 => Ok(IpVersion::V6),
            other => Err(InvalidIpVersion(other)),
        }
    }
}

impl IpVersion {
    /// Resolve a requested version, falling back to IPv4 with a warning.
    pub fn resolve(raw: u8, sink: &dyn EventSink) -> Self {
        match Self::try_from(raw) {
            Ok(version) => version,
            Err(InvalidIpVersion(raw)) => {
                sink.warn(&format!("invalid ip version: {raw}, use ipv4"));
                IpVersion::V4
            }
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            IpVersion::V4 => 4,
            IpVersion::V6 => 6,
        }
    }

    /// Wildcard address a listener binds (`0.0.0.0` / `::`).
    pub fn unspecified(&self) -> IpAddr {
        match self {
            IpVersion::V4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpVersion::V6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        }
    }

    /// Loopback address a client dials (`127.0.0.1` / `::1`).
    pub fn loopback(&self) -> IpAddr {
        match self {
            IpVersion::V4 => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpVersion::V6 => IpAddr::V6(Ipv6Addr::LOCALHOST),
        }
    }

    pub fn listen_addr(&self, port: u16) -> SocketAddr {
        SocketAddr::new(self.unspecified(), port)
    }

    pub fn loopback_addr(&self, port: u16) -> SocketAddr {
        SocketAddr::new(self.loopback(), port)
    }

    pub(crate) fn domain(&self) -> Domain {
        match self {
            IpVersion::V4 => Domain::IPV4,
            IpVersion::V6 => Domain::IPV6,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ipv{}", self.number())
    }
}

/// Name of the thread (and log prefix) for a loop requested with `raw`.
pub fn loop_label(raw: u8) -> String {
    format!("ipv{raw}_thread")
}
