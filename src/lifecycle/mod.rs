//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Default config → Init logging → Install signal handler → Launch loops
//!
//! Shutdown (shutdown.rs):
//!     trigger() → flag set → sleepers woken → wake hooks run
//!         → blocking accept/read calls return
//!         → each loop exits at its next check
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl+C) → Shutdown::trigger
//! ```
//!
//! # Design Decisions
//! - Ordered startup: logging first, loops last
//! - One signal shared by both loops; triggering is idempotent
//! - Blocking sockets are woken by hooks rather than polled with timeouts

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::run_program;
