use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::Limit;

/// Default refill period between bucket resets.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Per-flow configuration.
///
/// A flow is shaped by two knobs: the token budget added each interval
/// and the interval itself. Burst headroom and the advisory fair share
/// are derived from the limit, not configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowConfig {
    /// Tokens added per interval, or unlimited to bypass accounting
    pub limit: Limit,

    /// Refill period (default 1 second)
    pub interval: Duration,
}

impl FlowConfig {
    /// Create a configuration with the given limit and the default interval.
    pub fn new(limit: Limit) -> Self {
        Self {
            limit,
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Shorthand for a finite per-interval budget.
    pub fn limited(tokens: u64) -> Self {
        Self::new(Limit::Finite(tokens))
    }

    /// Shorthand for a flow that admits everything immediately.
    pub fn unlimited() -> Self {
        Self::new(Limit::Unlimited)
    }

    /// Set the refill interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Validate the configuration before a flow is created from it.
    pub(crate) fn validate(&self) -> Result<i64> {
        if self.interval.is_zero() {
            return Err(Error::InvalidInterval);
        }
        self.limit.to_raw()
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            limit: Limit::Unlimited,
            interval: DEFAULT_INTERVAL,
        }
    }
}
