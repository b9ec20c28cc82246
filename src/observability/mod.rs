//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Service loops emit events through an injected sink:
//!     → sink.rs (EventSink trait: log + flush)
//!         → TracingSink → tracing → logging.rs layers
//!               → console (stdout)
//!               → rolling file (size + daily rotation)
//!         → MemorySink (captured in tests)
//! ```
//!
//! # Design Decisions
//! - Loops never touch the global subscriber directly; the sink is passed in
//! - One registry per process, installed before any loop starts
//! - Each loop iteration flushes the sink to bound latency in the file

pub mod logging;
pub mod sink;

pub use logging::{init_logging, LogHandle, LoggingError, RollingFile};
pub use sink::{EventSink, LogRecord, MemorySink, ScopedSink, TracingSink};
