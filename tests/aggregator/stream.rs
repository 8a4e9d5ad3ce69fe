//! Tests for the Stream view.

use core::future::poll_fn;
use core::pin::Pin;

use errchan::prelude::*;
use futures_core::stream::{FusedStream, Stream};
use tokio::time::timeout;

use super::WAIT;

async fn next_item<S: Stream + Unpin>(stream: &mut S) -> Option<S::Item> {
    poll_fn(|cx| Pin::new(&mut *stream).poll_next(cx)).await
}

#[tokio::test]
async fn stream_yields_errors_then_ends() {
    let errors = AggregatorConfig::new().with_capacity(3).build();
    for id in 0..3u32 {
        errors.wrap(async move { Err::<(), _>(id) });
    }
    timeout(WAIT, errors.wait_idle()).await.unwrap();
    errors.close();

    let mut stream = errors.stream();
    let mut seen = Vec::new();
    while let Some(err) = timeout(WAIT, next_item(&mut stream)).await.unwrap() {
        seen.push(err);
    }
    seen.sort_unstable();

    assert_eq!(seen, [0, 1, 2]);
    assert!(stream.is_terminated());
}

#[tokio::test]
async fn terminated_stream_stays_terminated() {
    let errors = ErrorAggregator::<String>::new();
    errors.close();

    let mut stream = errors.stream();
    assert!(!stream.is_terminated());
    assert_eq!(timeout(WAIT, next_item(&mut stream)).await.unwrap(), None);
    assert!(stream.is_terminated());
    assert_eq!(next_item(&mut stream).await, None);
}

#[tokio::test]
async fn stream_and_next_share_the_channel() {
    let errors = AggregatorConfig::new().with_capacity(2).build();
    errors.wrap(async { Err::<(), _>("first") });
    errors.wrap(async { Err::<(), _>("second") });
    timeout(WAIT, errors.wait_idle()).await.unwrap();

    let from_next = timeout(WAIT, errors.next()).await.unwrap().unwrap();
    let mut stream = errors.stream();
    let from_stream = timeout(WAIT, next_item(&mut stream)).await.unwrap().unwrap();

    let mut both = [from_next, from_stream];
    both.sort_unstable();
    assert_eq!(both, ["first", "second"]);
}
