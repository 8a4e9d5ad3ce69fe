//! Convenience re-exports for common usage patterns.
//!
//! ```
//! use errchan::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let errors: ErrorAggregator<String> = AggregatorConfig::new().build();
//! errors.close();
//! assert_eq!(errors.try_next(), Err(TryNextError::Closed));
//! # }
//! ```

pub use crate::aggregator::{ErrorAggregator, ErrorStream};
pub use crate::config::{AggregatorConfig, Overflow};
pub use crate::error::{ShutdownTimeout, TryNextError};
pub use crate::task::{spawn_task, TaskOutcome, TaskOutput};
