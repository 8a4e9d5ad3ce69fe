use core::pin::Pin;
use core::task::{Context, Poll};

use futures_core::stream::{FusedStream, Stream};

use super::ErrorAggregator;

/// [`Stream`] view over an [`ErrorAggregator`].
///
/// Yields each delivered error and ends once the aggregator is closed and
/// every in-flight delivery has drained. Created by
/// [`ErrorAggregator::stream`].
#[derive(Debug)]
#[must_use = "streams do nothing unless polled"]
pub struct ErrorStream<'a, E> {
    aggregator: &'a ErrorAggregator<E>,
    terminated: bool,
}

impl<'a, E> ErrorStream<'a, E> {
    pub(crate) fn new(aggregator: &'a ErrorAggregator<E>) -> Self {
        Self { aggregator, terminated: false }
    }
}

impl<E> Stream for ErrorStream<'_, E> {
    type Item = E;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<E>> {
        let this = self.get_mut();
        if this.terminated {
            return Poll::Ready(None);
        }

        let next = this.aggregator.poll_next_error(cx);
        if let Poll::Ready(None) = next {
            this.terminated = true;
        }
        next
    }
}

impl<E> FusedStream for ErrorStream<'_, E> {
    fn is_terminated(&self) -> bool {
        self.terminated
    }
}
