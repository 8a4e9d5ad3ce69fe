//! Collect the errors of background tasks into a single closable stream.
//!
//! An [`ErrorAggregator`] runs each wrapped task on its own tokio task. Tasks
//! that succeed stay silent; a task that fails hands its error, unchanged, to
//! the one consumer reading [`ErrorAggregator::next`]. Closing the aggregator
//! stops further deliveries and ends the stream, and it is safe at any point,
//! even while producers are mid-delivery.
//!
//! # Examples
//!
//! ## Racing Failures Against Cancellation
//!
//! ```
//! use std::time::Duration;
//!
//! use errchan::ErrorAggregator;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let errors = ErrorAggregator::new();
//!
//! errors.wrap(async {
//!     tokio::time::sleep(Duration::from_millis(10)).await;
//!     Err::<(), _>("worker a gave up")
//! });
//! errors.wrap(async { Ok::<_, &str>(()) });
//!
//! tokio::select! {
//!     _ = tokio::time::sleep(Duration::from_secs(5)) => unreachable!(),
//!     err = errors.next() => assert_eq!(err, Some("worker a gave up")),
//! }
//!
//! errors.close_and_wait().await;
//! # }
//! ```
//!
//! ## Bounded Shutdown
//!
//! ```
//! use std::time::Duration;
//!
//! use errchan::{AggregatorConfig, Overflow};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let errors = AggregatorConfig::new()
//!     .with_capacity(4)
//!     .with_overflow(Overflow::DropNewest)
//!     .build::<&str>();
//!
//! for _ in 0..8 {
//!     errors.wrap(async { Err::<(), _>("quota exceeded") });
//! }
//! errors.wait_idle().await;
//!
//! assert_eq!(errors.drain_ready().len(), 4);
//! assert_eq!(errors.dropped(), 4);
//! assert!(errors.close_within(Duration::from_secs(1)).await.is_ok());
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for [`AggregatorConfig`] and [`Overflow`].
//! - `tracing`: emit `tracing` events on delivery, drops, and closure.

/// The error aggregator and its stream view
pub mod aggregator;
/// Aggregator configuration and overflow policies
pub mod config;
/// Errors produced by the aggregator itself
pub mod error;
/// Convenience re-exports
pub mod prelude;
/// Task outputs and single-task outcomes
pub mod task;

use smallvec::SmallVec;

pub use aggregator::{ErrorAggregator, ErrorStream};
pub use config::{AggregatorConfig, Overflow};
pub use error::{ShutdownTimeout, TryNextError};
pub use task::{spawn_task, TaskOutcome, TaskOutput};

/// SmallVec-backed collection returned by
/// [`ErrorAggregator::drain_ready`].
///
/// Holds one error inline, which covers the common case of draining a
/// single-slot channel without allocating.
pub type ErrorVec<E> = SmallVec<[E; 1]>;
