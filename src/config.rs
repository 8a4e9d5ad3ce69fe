//! Aggregator configuration.
//!
//! # Examples
//!
//! ```
//! use errchan::{AggregatorConfig, Overflow};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let errors = AggregatorConfig::new()
//!     .with_capacity(8)
//!     .with_overflow(Overflow::DropNewest)
//!     .build::<String>();
//!
//! assert_eq!(errors.config().capacity, 8);
//! # }
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::aggregator::ErrorAggregator;

/// What a failing task does when the channel has no room left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Overflow {
    /// Wait for the consumer to make room, or for the aggregator to close.
    #[default]
    Wait,
    /// Drop the error immediately and count it in
    /// [`ErrorAggregator::dropped`].
    DropNewest,
}

/// Settings for an [`ErrorAggregator`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AggregatorConfig {
    /// Number of delivered errors the channel holds before producers have to
    /// wait. Zero is treated as one.
    pub capacity: usize,
    /// Policy applied when the channel is full.
    pub overflow: Overflow,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self { capacity: 1, overflow: Overflow::Wait }
    }
}

impl AggregatorConfig {
    /// Creates a configuration with default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the channel capacity.
    #[inline]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the overflow policy.
    #[inline]
    pub fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    /// Capacity actually used for the channel, never zero.
    #[inline]
    pub fn effective_capacity(&self) -> usize {
        self.capacity.max(1)
    }

    /// Builds an open aggregator with these settings.
    pub fn build<E: Send + 'static>(self) -> ErrorAggregator<E> {
        ErrorAggregator::with_config(self)
    }
}
