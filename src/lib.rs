//! Dual-stack TCP demo services.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────── process ─────────────────────────────┐
//!   │                                                                  │
//!   │   lifecycle::startup  ──▶  service::Supervisor                   │
//!   │                              │                  │                │
//!   │                       ipv4_thread          ipv6_thread           │
//!   │                              │                  │                │
//!   │                 ┌────────────┴───┐      ┌───────┴────────┐       │
//!   │                 │  ServiceLoop   │      │  ServiceLoop   │       │
//!   │                 │ (sync server / │      │ (sync server / │       │
//!   │                 │  reactor /     │      │  reactor /     │       │
//!   │                 │  client)       │      │  client)       │       │
//!   │                 └───────┬────────┘      └───────┬────────┘       │
//!   │                         │ net::{Listener,Dialer}│                │
//!   │                         │ net::exchange         │                │
//!   │                         ▼                       ▼                │
//!   │                   0.0.0.0:20712            [::]:20712            │
//!   │                                                                  │
//!   │  ┌────────────────────────────────────────────────────────────┐  │
//!   │  │                  Cross-Cutting Concerns                    │  │
//!   │  │  config · observability (sink, rolling log) · resilience   │  │
//!   │  │  (retry delay) · lifecycle (shutdown, signals)             │  │
//!   │  └────────────────────────────────────────────────────────────┘  │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each program (`sync_tcp_server`, `async_tcp_server`, `sync_tcp_client`)
//! runs one loop per IP version. Every iteration handles exactly one
//! connection, and every connection is closed before the next begins.

// Core subsystems
pub mod config;
pub mod net;
pub mod service;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::ServiceConfig;
pub use lifecycle::Shutdown;
pub use observability::{EventSink, MemorySink};
pub use service::{ReactorServer, ServiceContext, Supervisor, SyncClient, SyncServer};
