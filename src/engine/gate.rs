//! Waiter gate: parks admission callers until the next interval boundary.
//!
//! The reset ticker publishes each new interval version through a watch
//! channel; every parked caller wakes on the send. There is no polling
//! and no per-waiter bookkeeping.

use tokio::sync::watch;

/// Notify-all gate keyed on the interval version.
#[derive(Debug)]
pub struct VersionGate {
    tx: watch::Sender<u16>,
}

impl VersionGate {
    /// Create a gate publishing the given initial version.
    pub fn new(initial: u16) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Publish a new version, waking every parked waiter.
    pub fn advance(&self, version: u16) {
        self.tx.send_replace(version);
    }

    /// Block until the published version differs from `observed`, then
    /// return the new version.
    ///
    /// A caller that raced a reset (the version moved between its probe
    /// and the wait) returns immediately.
    pub async fn wait(&self, observed: u16) -> u16 {
        let mut rx = self.tx.subscribe();
        loop {
            let current = *rx.borrow_and_update();
            if current != observed {
                return current;
            }
            // The sender lives as long as the flow, so this only fails
            // during teardown; report the last seen version and let the
            // caller re-probe.
            if rx.changed().await.is_err() {
                return current;
            }
        }
    }
}
