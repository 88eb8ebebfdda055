use std::fmt;

use crate::types::FlowName;

/// Unified error type for flow operations
#[derive(Debug)]
pub enum Error {
    /// Operation against a name with no registered flow
    UnknownFlow(FlowName),

    /// Creation of a flow whose name is already registered
    DuplicateFlow(FlowName),

    /// Limit is zero or too large to derive a burst cap
    InvalidLimit(u64),

    /// Refill interval is zero
    InvalidInterval,

    /// No async runtime available to schedule the reset ticker
    NoRuntime,

    /// Helper task went away before delivering its message
    TaskAborted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownFlow(name) => write!(f, "Unknown flow: {}", name),
            Error::DuplicateFlow(name) => write!(f, "Flow already exists: {}", name),
            Error::InvalidLimit(n) => write!(f, "Invalid limit: {}", n),
            Error::InvalidInterval => write!(f, "Interval must be non-zero"),
            Error::NoRuntime => write!(f, "No runtime available for the reset ticker"),
            Error::TaskAborted => write!(f, "Take task aborted before completion"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias for flow operations
pub type Result<T> = std::result::Result<T, Error>;
