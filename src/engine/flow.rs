//! A named, rate-limited flow and its admission engine.
//!
//! Admission combines a token bucket with Random Early Detection:
//! each attempt deducts a slice of the request from the bucket in one
//! atomic step, then draws a uniform number against the pre-probe
//! level. The draw admits with probability `remaining / previous`, so
//! a small request against a full bucket almost always passes while a
//! large request against a drained bucket almost always parks until
//! the next interval. This keeps small control messages moving when
//! large transfers have the bucket under pressure.

use std::time::Duration;

use rand::Rng;

use crate::engine::account::FlowAccount;
use crate::engine::gate::VersionGate;
use crate::metrics::METRICS;
use crate::types::{FlowName, Limit, UNLIMITED};

/// A single rate-limited flow.
///
/// Shared by reference between the admission callers and the reset
/// ticker; all state lives in lock-free counters.
#[derive(Debug)]
pub struct Flow {
    name: FlowName,
    interval: Duration,
    account: FlowAccount,
    gate: VersionGate,
}

impl Flow {
    /// Create a flow from a validated raw limit.
    pub(crate) fn new(name: FlowName, limit: i64, interval: Duration) -> Self {
        let account = FlowAccount::new(limit);
        let gate = VersionGate::new(account.version());
        Self {
            name,
            interval,
            account,
            gate,
        }
    }

    /// The flow's registered name.
    #[inline]
    pub fn name(&self) -> &FlowName {
        &self.name
    }

    /// The refill period.
    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The current per-interval limit.
    #[inline]
    pub fn limit(&self) -> Limit {
        Limit::from_raw(self.account.limit())
    }

    /// Tokens admitted so far in the current interval.
    #[inline]
    pub fn allowed(&self) -> u64 {
        self.account.allowed()
    }

    /// Admitted total of the last completed interval.
    #[inline]
    pub fn prev_allowed(&self) -> u64 {
        self.account.prev_allowed()
    }

    /// Replace the limit; burst, fair share and bucket headroom are
    /// re-derived from the new value.
    pub(crate) fn set_limit(&self, limit: i64) {
        self.account.set_limit(limit);
        METRICS.inc(&METRICS.limit_changes);
        tracing::debug!("Flow {} limit set to {}", self.name, Limit::from_raw(limit));
    }

    /// Advance to the next interval and release every parked waiter.
    /// Called from the reset ticker.
    pub(crate) fn reset(&self) {
        let version = self.account.reset();
        self.gate.advance(version);
        METRICS.inc(&METRICS.resets_total);
    }

    /// Acquire `n` tokens, blocking until the full amount is admitted.
    ///
    /// Requests larger than one interval's budget are deducted in
    /// slices of at most `limit` tokens; each admitted slice reduces
    /// the outstanding amount, so a large request completes by
    /// spanning interval boundaries. A rejected attempt refunds its
    /// slice and parks until the ticker advances the interval.
    pub async fn take(&self, n: u64) {
        METRICS.inc(&METRICS.takes_total);

        let mut need = n;
        loop {
            let limit = self.account.limit();
            if limit == UNLIMITED || need == 0 {
                return;
            }

            let slice = need.min(limit as u64) as i64;
            let observed = self.account.version();

            if self.red_probe(slice) {
                need -= slice as u64;
            } else {
                METRICS.inc(&METRICS.waits_total);
                self.gate.wait(observed).await;
            }
        }
    }

    /// Make a single admission attempt for `n` tokens without blocking.
    ///
    /// Returns true only if the entire request was admitted by one
    /// probe; a request above the per-interval limit is refused
    /// outright since a single probe can never cover it.
    pub fn try_take(&self, n: u64) -> bool {
        let limit = self.account.limit();
        if limit == UNLIMITED || n == 0 {
            return true;
        }
        if n > limit as u64 {
            return false;
        }
        self.red_probe(n as i64)
    }

    /// One probe of the RED admission decision: deduct the slice,
    /// admit with probability `remaining / previous`, refund on any
    /// rejection.
    fn red_probe(&self, slice: i64) -> bool {
        let (previous, remaining) = self.account.probe(slice);

        if remaining > 0 {
            let r = rand::thread_rng().gen_range(1..=previous);
            if r <= remaining {
                self.account.admit(slice as u64);
                METRICS.add(&METRICS.tokens_admitted, slice as u64);
                return true;
            }
            METRICS.inc(&METRICS.red_rejections);
            tracing::trace!(
                "Flow {} rejected slice {} at level {}/{}",
                self.name,
                slice,
                remaining,
                previous
            );
        } else {
            METRICS.inc(&METRICS.empty_rejections);
        }

        self.account.refund(slice);
        false
    }

    /// Direct access to the accounting record for tests.
    #[cfg(test)]
    pub(crate) fn account(&self) -> &FlowAccount {
        &self.account
    }

    /// Point-in-time view of the accounting record.
    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            limit: Limit::from_raw(self.account.limit()),
            burst: Limit::from_raw(self.account.burst()),
            fair: Limit::from_raw(self.account.fair()),
            tokens: self.account.tokens().max(0),
            allowed: self.account.allowed(),
            prev_allowed: self.account.prev_allowed(),
            version: self.account.version(),
            interval: self.interval,
        }
    }
}

/// Point-in-time view of a flow's accounting record.
///
/// The bucket level is clamped at zero: a probe in flight may have the
/// counter transiently negative, which is not observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowSnapshot {
    pub limit: Limit,
    pub burst: Limit,
    pub fair: Limit,
    pub tokens: i64,
    pub allowed: u64,
    pub prev_allowed: u64,
    pub version: u16,
    pub interval: Duration,
}
