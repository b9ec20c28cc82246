//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Server role:
//!     endpoint.rs (IpVersion → unspecified address + port)
//!     → listener.rs (bind, accept; blocking or reactor-driven)
//!     → connection.rs (id, peer, tracker guard)
//!     → exchange.rs (write greeting once, close always)
//!
//! Client role:
//!     endpoint.rs (IpVersion → loopback address + port)
//!     → dialer.rs (connect)
//!     → connection.rs
//!     → exchange.rs (one read per call, no reassembly)
//!
//! Connection States:
//!     Accepted/Connected → Exchanging → Closed
//! ```
//!
//! # Design Decisions
//! - Each socket is owned by exactly one loop; nothing here is shared
//! - The IPv6 listener is IPv6-only so both families can share the port
//! - Payloads carry no framing; a read returns whatever the kernel has

pub mod connection;
pub mod dialer;
pub mod endpoint;
pub mod exchange;
pub mod listener;

pub use connection::{Connection, ConnectionGuard, ConnectionId, ConnectionTracker, Transport};
pub use dialer::Dialer;
pub use endpoint::{IpVersion, InvalidIpVersion};
pub use exchange::{ReadOutcome, WriteOutcome, ASYNC_SERVER_GREETING, SYNC_SERVER_GREETING};
pub use listener::{AsyncListener, Listener, ListenerError};
