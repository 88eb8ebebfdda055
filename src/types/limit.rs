use std::fmt;

use crate::error::{Error, Result};

/// Raw counter value representing "unlimited" inside the accounting record.
pub(crate) const UNLIMITED: i64 = -1;

/// Burst headroom multiplier: a flow may accumulate up to `5 x limit` tokens.
pub(crate) const BURST_FACTOR: i64 = 5;

/// Advisory per-member share divisor: `fair = limit / 5`.
pub(crate) const FAIR_DIVISOR: i64 = 5;

/// Largest accepted finite limit. Bounded so the derived burst
/// (`5 x limit`) still fits in the signed counter.
pub const MAX_LIMIT: u64 = (i64::MAX / BURST_FACTOR) as u64;

/// Per-interval token budget of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Tokens added to the bucket each interval. Must be at least 1.
    Finite(u64),
    /// No limiting; admission bypasses all accounting.
    Unlimited,
}

impl Limit {
    /// Check if this limit disables accounting entirely.
    #[inline]
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Limit::Unlimited)
    }

    /// Convert to the raw counter representation, validating the range.
    pub(crate) fn to_raw(self) -> Result<i64> {
        match self {
            Limit::Unlimited => Ok(UNLIMITED),
            Limit::Finite(n) if n == 0 || n > MAX_LIMIT => Err(Error::InvalidLimit(n)),
            Limit::Finite(n) => Ok(n as i64),
        }
    }

    /// Convert from the raw counter representation.
    #[inline]
    pub(crate) fn from_raw(raw: i64) -> Self {
        if raw < 0 {
            Limit::Unlimited
        } else {
            Limit::Finite(raw as u64)
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Finite(n) => write!(f, "{}", n),
            Limit::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Derive the bucket cap from a raw limit.
#[inline]
pub(crate) fn derive_burst(limit: i64) -> i64 {
    if limit == UNLIMITED {
        UNLIMITED
    } else {
        limit.saturating_mul(BURST_FACTOR)
    }
}

/// Derive the advisory per-member share from a raw limit.
#[inline]
pub(crate) fn derive_fair(limit: i64) -> i64 {
    if limit == UNLIMITED {
        UNLIMITED
    } else {
        limit / FAIR_DIVISOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_raw_finite() {
        assert_eq!(Limit::Finite(512).to_raw().unwrap(), 512);
    }

    #[test]
    fn test_to_raw_unlimited() {
        assert_eq!(Limit::Unlimited.to_raw().unwrap(), UNLIMITED);
    }

    #[test]
    fn test_to_raw_rejects_zero() {
        assert!(matches!(
            Limit::Finite(0).to_raw(),
            Err(Error::InvalidLimit(0))
        ));
    }

    #[test]
    fn test_to_raw_rejects_oversized() {
        let too_big = MAX_LIMIT + 1;
        assert!(matches!(
            Limit::Finite(too_big).to_raw(),
            Err(Error::InvalidLimit(_))
        ));
    }

    #[test]
    fn test_from_raw_round_trip() {
        assert_eq!(Limit::from_raw(512), Limit::Finite(512));
        assert_eq!(Limit::from_raw(UNLIMITED), Limit::Unlimited);
    }

    #[test]
    fn test_derivations() {
        assert_eq!(derive_burst(512), 2560);
        assert_eq!(derive_fair(512), 102);
        assert_eq!(derive_burst(UNLIMITED), UNLIMITED);
        assert_eq!(derive_fair(UNLIMITED), UNLIMITED);
    }

    #[test]
    fn test_burst_saturates() {
        let raw = MAX_LIMIT as i64;
        assert!(derive_burst(raw) > 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Limit::Finite(100)), "100");
        assert_eq!(format!("{}", Limit::Unlimited), "unlimited");
    }
}
