//! Cooperative shutdown signalling

use log::info;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Process-wide stop flag. Set once, never cleared.
///
/// `trigger` is idempotent and safe to call from a signal-handler task
/// concurrently with worker execution. Workers observe the flag with
/// `is_triggered` at their loop checkpoints; the supervisor parks on
/// `wait`.
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    triggered: AtomicBool,
    notify: Notify,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stop flag and wake anyone waiting. Repeat calls are no-ops.
    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            info!("Stop signal received, shutting down workers");
            self.notify.notify_waiters();
        }
    }

    /// Non-blocking observation, suitable for a loop checkpoint.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Wait until the flag is set. Returns immediately if already set.
    pub async fn wait(&self) {
        let mut notified = pin!(self.notify.notified());
        loop {
            // Register interest before re-checking, so a trigger landing
            // between the check and the await cannot be missed.
            notified.as_mut().enable();
            if self.is_triggered() {
                return;
            }
            notified.as_mut().await;
            notified.set(self.notify.notified());
        }
    }
}
