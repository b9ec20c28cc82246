//! Stop signal shared by the service loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tokio::sync::watch;

type WakeHook = Box<dyn Fn() + Send + Sync>;

/// Coordinator for stopping the service loops.
///
/// Works from both blocking threads (`is_triggered`, `sleep`) and async
/// contexts (`wait`). Loops blocked inside a socket call register a wake hook
/// that unblocks them once the signal fires.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

struct Inner {
    triggered: AtomicBool,
    lock: Mutex<()>,
    sleepers: Condvar,
    tx: watch::Sender<bool>,
    hooks: Mutex<Vec<WakeHook>>,
}

impl Shutdown {
    /// Create a new, untriggered signal.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                triggered: AtomicBool::new(false),
                lock: Mutex::new(()),
                sleepers: Condvar::new(),
                tx,
                hooks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Fire the signal. Later calls are no-ops.
    pub fn trigger(&self) {
        {
            let _guard = self.inner.lock.lock();
            if self.inner.triggered.swap(true, Ordering::SeqCst) {
                return;
            }
            self.inner.sleepers.notify_all();
        }
        self.inner.tx.send_replace(true);

        let hooks = std::mem::take(&mut *self.inner.hooks.lock());
        for hook in hooks {
            hook();
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// Block for `duration` or until the signal fires.
    ///
    /// Returns `true` if the sleep was cut short by the signal.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut guard = self.inner.lock.lock();
        while !self.is_triggered() {
            if self
                .inner
                .sleepers
                .wait_until(&mut guard, deadline)
                .timed_out()
            {
                return self.is_triggered();
            }
        }
        true
    }

    /// Resolve once the signal fires.
    pub async fn wait(&self) {
        let mut rx = self.inner.tx.subscribe();
        // The sender lives as long as `self`, so this only errors on drop.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }

    /// Run `hook` when the signal fires, or immediately if it already has.
    pub fn on_trigger<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if self.is_triggered() {
            hook();
            return;
        }

        let mut hooks = self.inner.hooks.lock();
        if self.is_triggered() {
            drop(hooks);
            hook();
        } else {
            hooks.push(Box::new(hook));
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Shutdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shutdown")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}
