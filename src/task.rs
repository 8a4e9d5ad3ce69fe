//! Task outputs and single-task outcomes.
//!
//! A task is any future (or, for
//! [`wrap_blocking`](crate::ErrorAggregator::wrap_blocking), any closure)
//! whose output implements [`TaskOutput`]. The only question asked of that
//! output is whether it carries an error.

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use pin_project_lite::pin_project;
use tokio::task::JoinHandle;

/// Output of a wrapped task, reduced to "failed with this error" or "fine".
///
/// # Examples
///
/// ```
/// use errchan::TaskOutput;
///
/// assert_eq!(Err::<u8, _>("boom").into_error(), Some("boom"));
/// assert_eq!(Ok::<_, &str>(3).into_error(), None);
/// assert_eq!(Some("boom").into_error(), Some("boom"));
/// ```
pub trait TaskOutput {
    /// The error a failed task carries.
    type Error;

    /// Returns the error, or `None` if the task succeeded.
    fn into_error(self) -> Option<Self::Error>;
}

impl<T, E> TaskOutput for Result<T, E> {
    type Error = E;

    #[inline]
    fn into_error(self) -> Option<E> {
        self.err()
    }
}

impl<E> TaskOutput for Option<E> {
    type Error = E;

    #[inline]
    fn into_error(self) -> Option<E> {
        self
    }
}

/// Spawns a single task and returns a future for its error.
///
/// The returned [`TaskOutcome`] resolves to `Some(error)` if the task failed
/// and to `None` if it succeeded or panicked. Dropping the outcome detaches
/// the task; it keeps running.
///
/// # Panics
///
/// Panics if called outside of a tokio runtime.
///
/// # Examples
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let outcome = errchan::spawn_task(async { Err::<(), _>("no such file") });
/// assert_eq!(outcome.await, Some("no such file"));
/// # }
/// ```
pub fn spawn_task<F, E>(task: F) -> TaskOutcome<E>
where
    F: Future + Send + 'static,
    F::Output: TaskOutput<Error = E>,
    E: Send + 'static,
{
    TaskOutcome { handle: tokio::spawn(async move { task.await.into_error() }) }
}

pin_project! {
    /// Future returned by [`spawn_task`].
    #[must_use = "futures do nothing unless polled"]
    #[derive(Debug)]
    pub struct TaskOutcome<E> {
        #[pin]
        handle: JoinHandle<Option<E>>,
    }
}

impl<E> TaskOutcome<E> {
    /// Returns `true` once the task has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancels the task. The outcome then resolves to `None`.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl<E> Future for TaskOutcome<E> {
    type Output = Option<E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.project().handle.poll(cx).map(|joined| joined.ok().flatten())
    }
}
