//! Leveled event sink injected into every service loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::Level;

use crate::observability::logging::LogHandle;

/// Destination for the leveled text events a service loop produces.
///
/// Implementations must tolerate concurrent calls from both loop threads.
pub trait EventSink: Send + Sync {
    /// Record one event.
    fn log(&self, level: Level, message: &str);

    /// Push buffered events to their final destination.
    fn flush(&self);

    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }
}

/// Sink backed by the process-wide `tracing` subscriber.
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    handle: Option<LogHandle>,
}

impl TracingSink {
    /// Forward events to `tracing` and flush through the log file handle.
    pub fn new(handle: LogHandle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Forward events to `tracing` without a file to flush.
    pub fn console_only() -> Self {
        Self::default()
    }
}

impl EventSink for TracingSink {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{message}"),
            Level::WARN => tracing::warn!("{message}"),
            Level::INFO => tracing::info!("{message}"),
            Level::DEBUG => tracing::debug!("{message}"),
            Level::TRACE => tracing::trace!("{message}"),
        }
    }

    fn flush(&self) {
        if let Some(handle) = &self.handle {
            if let Err(e) = handle.flush() {
                tracing::warn!(error = %e, "Failed to flush log file");
            }
        }
    }
}

/// Prefixes every message with a fixed scope, e.g. the loop's thread label.
#[derive(Clone)]
pub struct ScopedSink {
    scope: String,
    inner: Arc<dyn EventSink>,
}

impl ScopedSink {
    pub fn new(scope: impl Into<String>, inner: Arc<dyn EventSink>) -> Self {
        Self {
            scope: scope.into(),
            inner,
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

impl EventSink for ScopedSink {
    fn log(&self, level: Level, message: &str) {
        self.inner.log(level, &format!("{} {}", self.scope, message));
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// One captured event.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
    /// Name of the thread that emitted the event.
    pub thread: Option<String>,
    pub at: Instant,
}

/// Sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
    flushes: AtomicU64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Messages only, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }

    /// Number of messages containing `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.message.contains(needle))
            .count()
    }

    /// Whether any event at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }

    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl EventSink for MemorySink {
    fn log(&self, level: Level, message: &str) {
        let record = LogRecord {
            level,
            message: message.to_string(),
            thread: std::thread::current().name().map(str::to_string),
            at: Instant::now(),
        };
        self.records.lock().push(record);
    }

    fn flush(&self) {
        self.flushes.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_captures_level_and_thread() {
        let sink = Arc::new(MemorySink::new());

        let worker = Arc::clone(&sink);
        std::thread::Builder::new()
            .name("ipv4_thread".into())
            .spawn(move || {
                worker.warn("invalid ip version: 5, use ipv4");
                worker.flush();
            })
            .unwrap()
            .join()
            .unwrap();

        sink.info("tcp sync server start.");

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, Level::WARN);
        assert_eq!(records[0].thread.as_deref(), Some("ipv4_thread"));
        assert!(sink.contains(Level::INFO, "server start"));
        assert_eq!(sink.count_containing("ip"), 1);
        assert_eq!(sink.flush_count(), 1);
    }

    #[test]
    fn scoped_sink_prefixes_and_forwards_flush() {
        let memory = Arc::new(MemorySink::new());
        let scoped = ScopedSink::new("ipv6_thread", memory.clone());

        scoped.info("start.");
        scoped.flush();

        assert_eq!(memory.messages(), vec!["ipv6_thread start.".to_string()]);
        assert_eq!(memory.flush_count(), 1);
        assert_eq!(scoped.scope(), "ipv6_thread");
    }

    #[test]
    fn tracing_sink_without_file_is_silent_on_flush() {
        let sink = TracingSink::console_only();
        sink.error("write error: broken pipe");
        sink.flush();
    }
}
