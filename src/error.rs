//! Errors reported by the aggregator itself.
//!
//! Task errors are never wrapped in these types; they reach the consumer
//! exactly as the task returned them.

use core::fmt;
use core::time::Duration;

/// Why [`ErrorAggregator::try_next`](crate::ErrorAggregator::try_next)
/// returned nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TryNextError {
    /// No error is ready, but more may still be delivered.
    Empty,
    /// The aggregator is closed and every delivery has drained.
    Closed,
}

impl fmt::Display for TryNextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("no error is ready"),
            Self::Closed => f.write_str("error aggregator is closed"),
        }
    }
}

impl std::error::Error for TryNextError {}

/// Producers were still running when
/// [`ErrorAggregator::close_within`](crate::ErrorAggregator::close_within)
/// gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownTimeout {
    /// How long the shutdown waited.
    pub timeout: Duration,
    /// Producers still running when the timeout elapsed.
    pub in_flight: usize,
}

impl fmt::Display for ShutdownTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} task(s) still running after waiting {:?} for shutdown",
            self.in_flight, self.timeout
        )
    }
}

impl std::error::Error for ShutdownTimeout {}
