//! Per-flow accounting record with token bucket semantics.
//!
//! Holds all mutable state of a flow as lock-free counters:
//! - The bucket level, probed and refunded by the admission path
//! - Admitted totals for the current and previous interval
//! - A rolling interval version used to park and release waiters
//!
//! There is no lock around the record. Every update is a single atomic
//! read-modify-write; callers tolerate observing a partial reset (it
//! costs one extra retry).

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use crate::types::{derive_burst, derive_fair, UNLIMITED};

/// Versions roll over at 16 bits and are compared only for inequality.
const VERSION_MASK: u64 = 0xFFFF;

/// Shared mutable accounting state of a single flow.
#[derive(Debug)]
pub struct FlowAccount {
    /// Tokens added per interval (UNLIMITED bypasses accounting)
    limit: AtomicI64,

    /// Bucket cap after refill, derived as 5 x limit
    burst: AtomicI64,

    /// Advisory per-member share, derived as limit / 5.
    /// Stored for parity with the limit but never consulted by admission.
    fair: AtomicI64,

    /// Current bucket level. Goes negative only transiently inside a
    /// probe; the rejection branch refunds before anyone can block on it.
    tokens: AtomicI64,

    /// Tokens admitted so far in the current interval
    allowed: AtomicU64,

    /// Admitted total of the last completed interval
    prev_allowed: AtomicU64,

    /// Free-running interval counter, masked to 16 bits on read
    version: AtomicU64,
}

impl FlowAccount {
    /// Create a record for the given raw limit. The bucket starts at
    /// full burst headroom.
    pub fn new(limit: i64) -> Self {
        let burst = derive_burst(limit);
        Self {
            limit: AtomicI64::new(limit),
            burst: AtomicI64::new(burst),
            fair: AtomicI64::new(derive_fair(limit)),
            tokens: AtomicI64::new(burst),
            allowed: AtomicU64::new(0),
            prev_allowed: AtomicU64::new(0),
            version: AtomicU64::new(0),
        }
    }

    /// Get the raw per-interval limit.
    #[inline]
    pub fn limit(&self) -> i64 {
        self.limit.load(Ordering::Acquire)
    }

    /// Get the raw bucket cap.
    #[inline]
    pub fn burst(&self) -> i64 {
        self.burst.load(Ordering::Acquire)
    }

    /// Get the raw advisory fair share.
    #[inline]
    pub fn fair(&self) -> i64 {
        self.fair.load(Ordering::Acquire)
    }

    /// Get the current bucket level.
    #[inline]
    pub fn tokens(&self) -> i64 {
        self.tokens.load(Ordering::Acquire)
    }

    /// Get the tokens admitted so far in the current interval.
    #[inline]
    pub fn allowed(&self) -> u64 {
        self.allowed.load(Ordering::Relaxed)
    }

    /// Get the admitted total of the last completed interval.
    #[inline]
    pub fn prev_allowed(&self) -> u64 {
        self.prev_allowed.load(Ordering::Relaxed)
    }

    /// Get the current interval version.
    #[inline]
    pub fn version(&self) -> u16 {
        (self.version.load(Ordering::Acquire) & VERSION_MASK) as u16
    }

    /// Replace limit, burst, fair and bucket level from a new raw limit.
    ///
    /// The four writes are independent atomic stores; a concurrent probe
    /// may observe a mix of old and new values. The bucket level is
    /// deliberately reset to the new full burst headroom. `allowed`,
    /// `prev_allowed` and `version` are untouched.
    pub fn set_limit(&self, limit: i64) {
        let burst = derive_burst(limit);
        self.limit.store(limit, Ordering::Release);
        self.burst.store(burst, Ordering::Release);
        self.fair.store(derive_fair(limit), Ordering::Release);
        self.tokens.store(burst, Ordering::Release);
    }

    /// Deduct `slice` tokens in a single atomic step.
    ///
    /// Returns `(previous, remaining)` where `previous` is the bucket
    /// level the probe actually hit and `remaining = previous - slice`.
    /// A non-positive `remaining` means the probe overdrew the bucket
    /// and the caller must refund.
    #[inline]
    pub fn probe(&self, slice: i64) -> (i64, i64) {
        let previous = self.tokens.fetch_sub(slice, Ordering::AcqRel);
        (previous, previous - slice)
    }

    /// Return `slice` tokens deducted by a failed probe.
    #[inline]
    pub fn refund(&self, slice: i64) {
        self.tokens.fetch_add(slice, Ordering::AcqRel);
    }

    /// Record an admitted slice.
    #[inline]
    pub fn admit(&self, slice: u64) {
        self.allowed.fetch_add(slice, Ordering::Relaxed);
    }

    /// Advance the flow to the next interval.
    ///
    /// In order: bump the version, snapshot `allowed` into
    /// `prev_allowed`, refill the bucket capped at burst. The three
    /// steps are individually atomic but not jointly; a caller racing
    /// the reset sees at worst one extra retry.
    ///
    /// Returns the new version.
    pub fn reset(&self) -> u16 {
        let version = self.version.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        self.prev_allowed
            .store(self.allowed.swap(0, Ordering::Relaxed), Ordering::Relaxed);

        let limit = self.limit.load(Ordering::Acquire);
        if limit != UNLIMITED {
            let burst = self.burst.load(Ordering::Acquire);
            let _ = self
                .tokens
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| {
                    Some(t.saturating_add(limit).min(burst))
                });
        }

        (version & VERSION_MASK) as u16
    }
}
