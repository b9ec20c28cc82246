//! Dual-stack supervisor: one thread per IP version.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::net::endpoint::loop_label;
use crate::observability::EventSink;
use crate::service::{ServiceError, ServiceLoop};

/// Raw IP versions launched by the shipped programs.
pub const DUAL_STACK: [u8; 2] = [4, 6];

/// How one loop ended.
#[derive(Debug)]
pub struct LoopExit {
    pub label: String,
    pub result: Result<(), ServiceError>,
}

enum Worker {
    Running(JoinHandle<Result<(), ServiceError>>),
    NotStarted(ServiceError),
}

/// Owns the loop threads and waits for them.
///
/// Loops are independent: one failing (for example on bind) leaves the
/// other running.
pub struct Supervisor {
    workers: Vec<(String, Worker)>,
    sink: Arc<dyn EventSink>,
}

impl Supervisor {
    /// Start one IPv4 and one IPv6 loop built by `factory`.
    pub fn launch<L, F>(factory: F, sink: Arc<dyn EventSink>) -> Self
    where
        F: FnMut(u8) -> L,
        L: ServiceLoop,
    {
        Self::launch_versions(&DUAL_STACK, factory, sink)
    }

    /// Start one loop per raw version in `versions`.
    pub fn launch_versions<L, F>(versions: &[u8], mut factory: F, sink: Arc<dyn EventSink>) -> Self
    where
        F: FnMut(u8) -> L,
        L: ServiceLoop,
    {
        let workers = versions
            .iter()
            .map(|&raw| {
                let label = loop_label(raw);
                let service = factory(raw);
                let spawned = thread::Builder::new()
                    .name(label.clone())
                    .spawn(move || service.run());

                let worker = match spawned {
                    Ok(handle) => Worker::Running(handle),
                    Err(source) => {
                        sink.error(&format!("failed to start {label}: {source}"));
                        Worker::NotStarted(ServiceError::Spawn {
                            name: label.clone(),
                            source,
                        })
                    }
                };
                (label, worker)
            })
            .collect();

        Self { workers, sink }
    }

    /// Number of loops that were launched (started or not).
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Block until every loop has ended and report how each one ended.
    pub fn join(self) -> Vec<LoopExit> {
        let sink = self.sink;
        self.workers
            .into_iter()
            .map(|(label, worker)| {
                let result = match worker {
                    Worker::Running(handle) => handle
                        .join()
                        .unwrap_or_else(|_| Err(ServiceError::Panicked(label.clone()))),
                    Worker::NotStarted(e) => Err(e),
                };

                match &result {
                    Ok(()) => sink.info(&format!("{label} exited.")),
                    Err(e) => sink.error(&format!("{label} exited: {e}")),
                }
                sink.flush();

                LoopExit { label, result }
            })
            .collect()
    }
}
