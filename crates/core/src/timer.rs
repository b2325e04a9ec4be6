use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type TimerCallback = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Arms delayed callbacks. The scheduler only talks to this trait so tests can
/// drive triggers with a manual clock instead of wall-clock sleeps.
pub trait Timer: Send + Sync {
    fn arm(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;
}

/// Cancels the armed callback when consumed. Dropping the handle without
/// calling `cancel` leaves the timer running.
pub struct TimerHandle(Box<dyn FnOnce() + Send>);

impl TimerHandle {
    pub fn new(cancel: Box<dyn FnOnce() + Send>) -> Self {
        Self(cancel)
    }

    pub fn cancel(self) {
        (self.0)()
    }
}

/// Production timer backed by a spawned task sleeping until the delay passes.
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn arm(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback.await;
        });
        TimerHandle::new(Box::new(move || handle.abort()))
    }
}

/// Test timer that collects armed callbacks and fires them on demand.
pub struct ManualTimer {
    armed: Mutex<Vec<ArmedEntry>>,
}

struct ArmedEntry {
    delay: Duration,
    callback: TimerCallback,
    cancelled: Arc<AtomicBool>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self {
            armed: Mutex::new(Vec::new()),
        }
    }

    /// Number of armed entries, cancelled ones included until fired.
    pub fn armed_count(&self) -> usize {
        self.armed.lock().unwrap().len()
    }

    pub fn armed_delays(&self) -> Vec<Duration> {
        self.armed.lock().unwrap().iter().map(|e| e.delay).collect()
    }

    /// Drains and runs every armed callback that was not cancelled.
    pub async fn fire_all(&self) {
        let entries: Vec<ArmedEntry> = {
            let mut armed = self.armed.lock().unwrap();
            armed.drain(..).collect()
        };
        for entry in entries {
            if !entry.cancelled.load(Ordering::SeqCst) {
                entry.callback.await;
            }
        }
    }
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for ManualTimer {
    fn arm(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.armed.lock().unwrap().push(ArmedEntry {
            delay,
            callback,
            cancelled: cancelled.clone(),
        });
        TimerHandle::new(Box::new(move || cancelled.store(true, Ordering::SeqCst)))
    }
}
