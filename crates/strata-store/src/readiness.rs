//! Readiness gate — a per-key single-shot latch. Created on first
//! `wait_and_get` against an absent key, fired when the key is later `put`.
//! Once fired, stays fired.
//!
//! Implemented with `tokio::sync::Notify` rather than a busy-spin on an
//! atomic, per DESIGN NOTES' explicit guidance to replace the spin-loop with
//! a park/unpark-style primitive. The `Notified` future is constructed
//! *before* the fired flag is checked so a concurrent `fire()` that lands
//! between the check and the await is never missed — `Notify` tracks
//! `notify_waiters()` calls against the point a `Notified` future was
//! created, not against when it was first polled.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct ReadinessGate {
    notify: Notify,
    fired: AtomicBool,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until `fire` has been called, possibly already having been
    /// called before this was invoked.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            if self.fired.load(Ordering::Acquire) {
                return;
            }
            notified.await;
            if self.fired.load(Ordering::Acquire) {
                return;
            }
        }
    }

    /// Fires the gate, waking every current and future waiter. Idempotent.
    pub fn fire(&self) {
        self.fired.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn fire_before_wait_does_not_block() {
        let gate = ReadinessGate::new();
        gate.fire();
        tokio::time::timeout(Duration::from_millis(100), gate.wait()).await.unwrap();
    }

    /// Many concurrent waiters, all released by a single fire.
    #[tokio::test]
    async fn ten_concurrent_waiters_all_released_by_one_fire() {
        let gate = Arc::new(ReadinessGate::new());
        let mut handles = Vec::new();
        for _ in 0..10 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move {
                gate.wait().await;
            }));
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        gate.fire();

        for h in handles {
            tokio::time::timeout(Duration::from_millis(200), h).await.unwrap().unwrap();
        }
    }
}
