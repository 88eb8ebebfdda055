//! Observability and metrics collection for the limiter.
//!
//! Provides lock-free counters for tracking admission activity across
//! all flows: takes, admitted tokens, rejections and waiter parks.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics instance for the process.
pub static METRICS: Metrics = Metrics::new();

/// Relaxed ordering for counters (eventual visibility is fine for metrics).
const RELAXED: Ordering = Ordering::Relaxed;

/// Collection of all limiter metrics.
pub struct Metrics {
    // Flow lifecycle counters
    pub flows_created: AtomicU64,
    pub limit_changes: AtomicU64,
    pub resets_total: AtomicU64,

    // Admission counters
    pub takes_total: AtomicU64,
    pub tokens_admitted: AtomicU64,
    pub red_rejections: AtomicU64,
    pub empty_rejections: AtomicU64,
    pub waits_total: AtomicU64,
}

impl Metrics {
    /// Create a new metrics instance with all counters at zero.
    pub const fn new() -> Self {
        Self {
            flows_created: AtomicU64::new(0),
            limit_changes: AtomicU64::new(0),
            resets_total: AtomicU64::new(0),

            takes_total: AtomicU64::new(0),
            tokens_admitted: AtomicU64::new(0),
            red_rejections: AtomicU64::new(0),
            empty_rejections: AtomicU64::new(0),
            waits_total: AtomicU64::new(0),
        }
    }

    /// Increment a counter.
    #[inline]
    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, RELAXED);
    }

    /// Add to a counter.
    #[inline]
    pub fn add(&self, counter: &AtomicU64, value: u64) {
        counter.fetch_add(value, RELAXED);
    }

    /// Get counter value.
    #[inline]
    pub fn get(&self, counter: &AtomicU64) -> u64 {
        counter.load(RELAXED)
    }

    /// Get a snapshot of all metrics for reporting.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            flows_created: self.flows_created.load(RELAXED),
            limit_changes: self.limit_changes.load(RELAXED),
            resets_total: self.resets_total.load(RELAXED),

            takes_total: self.takes_total.load(RELAXED),
            tokens_admitted: self.tokens_admitted.load(RELAXED),
            red_rejections: self.red_rejections.load(RELAXED),
            empty_rejections: self.empty_rejections.load(RELAXED),
            waits_total: self.waits_total.load(RELAXED),
        }
    }
}

/// Point-in-time snapshot of all metrics.
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub flows_created: u64,
    pub limit_changes: u64,
    pub resets_total: u64,

    pub takes_total: u64,
    pub tokens_admitted: u64,
    pub red_rejections: u64,
    pub empty_rejections: u64,
    pub waits_total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_operations() {
        let m = Metrics::new();
        assert_eq!(m.get(&m.takes_total), 0);

        m.inc(&m.takes_total);
        assert_eq!(m.get(&m.takes_total), 1);

        m.add(&m.tokens_admitted, 512);
        assert_eq!(m.get(&m.tokens_admitted), 512);
    }

    #[test]
    fn test_snapshot() {
        let m = Metrics::new();
        m.inc(&m.flows_created);
        m.inc(&m.takes_total);
        m.add(&m.tokens_admitted, 32);

        let snap = m.snapshot();
        assert_eq!(snap.flows_created, 1);
        assert_eq!(snap.takes_total, 1);
        assert_eq!(snap.tokens_admitted, 32);
        assert_eq!(snap.red_rejections, 0);
    }
}
