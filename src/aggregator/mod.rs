//! The [`ErrorAggregator`] and its stream view.
//!
//! An aggregator owns one bounded channel. Every wrapped task runs on its own
//! tokio task; when it fails, its error is sent on the channel unless the
//! aggregator has been closed in the meantime. The single consumer reads those
//! errors with [`ErrorAggregator::next`] or through an [`ErrorStream`].
//!
//! # Draining is the caller's job
//!
//! With the default [`Overflow::Wait`](crate::Overflow::Wait) policy a
//! failing task waits until the consumer makes room in the channel. If the
//! consumer stops reading, those producers stay parked until
//! [`close`](ErrorAggregator::close) releases them. Keep reading, close the
//! aggregator, or pick [`Overflow::DropNewest`](crate::Overflow::DropNewest).

mod conduit;
mod stream;
mod tracker;

use core::fmt;
use core::future::{poll_fn, Future};
use core::task::{Context, Poll};
use core::time::Duration;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::config::AggregatorConfig;
use crate::error::{ShutdownTimeout, TryNextError};
use crate::task::TaskOutput;
use crate::ErrorVec;

use self::conduit::{lock, Conduit};
use self::tracker::Tracker;

pub use self::stream::ErrorStream;

/// Collects the errors of concurrently running tasks into one stream.
///
/// # Examples
///
/// ```
/// use errchan::ErrorAggregator;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let errors = ErrorAggregator::new();
///
/// errors.wrap(async { Ok::<_, &str>(()) });
/// errors.wrap(async { Err::<(), _>("listener stopped") });
///
/// assert_eq!(errors.next().await, Some("listener stopped"));
/// errors.close();
/// assert_eq!(errors.next().await, None);
/// # }
/// ```
pub struct ErrorAggregator<E> {
    conduit: Arc<Conduit<E>>,
    tracker: Arc<Tracker>,
    receiver: Mutex<mpsc::Receiver<E>>,
    config: AggregatorConfig,
}

impl<E: Send + 'static> ErrorAggregator<E> {
    /// Creates an open aggregator with the default configuration.
    pub fn new() -> Self {
        Self::with_config(AggregatorConfig::default())
    }

    /// Creates an open aggregator using `config`.
    pub fn with_config(config: AggregatorConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.effective_capacity());
        Self {
            conduit: Arc::new(Conduit::new(sender, config.overflow)),
            tracker: Arc::new(Tracker::new()),
            receiver: Mutex::new(receiver),
            config,
        }
    }

    /// Runs `task` on its own tokio task and delivers its error, if any.
    ///
    /// Successful tasks deliver nothing. A task that fails after
    /// [`close`](Self::close) still runs to completion; its error is dropped
    /// and counted by [`dropped`](Self::dropped).
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn wrap<F>(&self, task: F)
    where
        F: Future + Send + 'static,
        F::Output: TaskOutput<Error = E>,
    {
        self.spawn_producer(async move { task.await.into_error() });
    }

    /// Runs a blocking `task` on tokio's blocking pool and delivers its error,
    /// if any.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn wrap_blocking<F, O>(&self, task: F)
    where
        F: FnOnce() -> O + Send + 'static,
        O: TaskOutput<Error = E>,
    {
        let handle = tokio::task::spawn_blocking(move || task().into_error());
        self.spawn_producer(async move { handle.await.ok().flatten() });
    }

    fn spawn_producer<F>(&self, producer: F)
    where
        F: Future<Output = Option<E>> + Send + 'static,
    {
        let guard = self.tracker.enter();
        let conduit = Arc::clone(&self.conduit);

        #[cfg(feature = "tracing")]
        tracing::trace!(in_flight = self.tracker.in_flight(), "error aggregator spawned a task");

        tokio::spawn(async move {
            let _guard = guard;
            if let Some(error) = producer.await {
                conduit.deliver(error).await;
            }
        });
    }
}

impl<E> ErrorAggregator<E> {
    /// Waits for the next delivered error.
    ///
    /// Returns `None` once the aggregator is closed and every in-flight
    /// delivery has drained. Errors delivered before closure are still
    /// returned first. Delivery order follows completion, not `wrap` order.
    pub async fn next(&self) -> Option<E> {
        poll_fn(|cx| self.poll_next_error(cx)).await
    }

    /// Polls for the next delivered error.
    ///
    /// Only the most recent poller is woken; the aggregator supports a single
    /// consumer.
    pub fn poll_next_error(&self, cx: &mut Context<'_>) -> Poll<Option<E>> {
        lock(&self.receiver).poll_recv(cx)
    }

    /// Returns a delivered error without waiting.
    ///
    /// Reports [`TryNextError::Empty`] while deliveries may still arrive, which
    /// includes the short window after [`close`](Self::close) in which
    /// producers are abandoning their errors.
    pub fn try_next(&self) -> Result<E, TryNextError> {
        lock(&self.receiver).try_recv().map_err(|err| match err {
            TryRecvError::Empty => TryNextError::Empty,
            TryRecvError::Disconnected => TryNextError::Closed,
        })
    }

    /// Takes every error that is ready right now.
    pub fn drain_ready(&self) -> ErrorVec<E> {
        let mut receiver = lock(&self.receiver);
        let mut errors = ErrorVec::new();
        while let Ok(error) = receiver.try_recv() {
            errors.push(error);
        }
        errors
    }

    /// Returns a [`Stream`](futures_core::Stream) over delivered errors.
    pub fn stream(&self) -> ErrorStream<'_, E> {
        ErrorStream::new(self)
    }

    /// Closes the aggregator. Calls after the first are no-ops.
    ///
    /// Pending and future reads observe closure instead of waiting forever,
    /// and producers still waiting for room in the channel drop their errors.
    pub fn close(&self) {
        if self.conduit.close() {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                in_flight = self.tracker.in_flight(),
                delivered = self.conduit.delivered(),
                dropped = self.conduit.dropped(),
                "error aggregator closed"
            );
        }
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.conduit.is_closed()
    }

    /// Waits until every spawned producer has finished, without closing.
    ///
    /// Under [`Overflow::Wait`](crate::Overflow::Wait) this only returns if
    /// someone keeps reading or the aggregator gets closed.
    pub async fn wait_idle(&self) {
        self.tracker.wait_idle().await;
    }

    /// Closes the aggregator and waits for every producer to finish.
    pub async fn close_and_wait(&self) {
        self.close();
        self.wait_idle().await;
    }

    /// Like [`close_and_wait`](Self::close_and_wait), giving up after
    /// `timeout`.
    ///
    /// The aggregator is closed either way; the error reports how many
    /// producers were still running.
    pub async fn close_within(&self, timeout: Duration) -> Result<(), ShutdownTimeout> {
        self.close();
        match tokio::time::timeout(timeout, self.wait_idle()).await {
            Ok(()) => Ok(()),
            Err(_elapsed) => Err(ShutdownTimeout { timeout, in_flight: self.in_flight() }),
        }
    }

    /// Number of producers that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.in_flight()
    }

    /// Number of errors placed on the channel so far.
    pub fn delivered(&self) -> usize {
        self.conduit.delivered()
    }

    /// Number of errors discarded because of closure or overflow.
    pub fn dropped(&self) -> usize {
        self.conduit.dropped()
    }

    /// Settings this aggregator was created with.
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }
}

impl<E: Send + 'static> Default for ErrorAggregator<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Drop for ErrorAggregator<E> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<E> fmt::Debug for ErrorAggregator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorAggregator")
            .field("closed", &self.is_closed())
            .field("in_flight", &self.in_flight())
            .field("delivered", &self.delivered())
            .field("dropped", &self.dropped())
            .field("config", &self.config)
            .finish()
    }
}
