//! Tests for how task results reach the consumer.

use std::sync::Arc;

use errchan::prelude::*;
use tokio::time::timeout;

use super::WAIT;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ListenerError {
    port: u16,
    reason: String,
}

async fn explode() -> Result<(), &'static str> {
    panic!("task exploded")
}

#[test]
fn aggregator_is_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    assert_send::<ErrorAggregator<String>>();
    assert_sync::<ErrorAggregator<String>>();
    assert_send::<TaskOutcome<String>>();
}

#[tokio::test]
async fn successful_tasks_deliver_nothing() {
    let errors = ErrorAggregator::<&str>::new();
    for _ in 0..5 {
        errors.wrap(async { Ok::<_, &str>(()) });
    }

    timeout(WAIT, errors.wait_idle()).await.unwrap();

    assert_eq!(errors.try_next(), Err(TryNextError::Empty));
    assert_eq!(errors.delivered(), 0);
    assert_eq!(errors.dropped(), 0);

    errors.close();
    assert_eq!(timeout(WAIT, errors.next()).await.unwrap(), None);
}

#[tokio::test]
async fn single_failure_is_delivered_exactly_once() {
    let errors = ErrorAggregator::new();
    errors.wrap(async { Err::<(), _>("E") });

    assert_eq!(timeout(WAIT, errors.next()).await.unwrap(), Some("E"));

    errors.close();
    assert_eq!(timeout(WAIT, errors.next()).await.unwrap(), None);
    assert_eq!(errors.delivered(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn delivered_counter_covers_every_read_error() {
    for _ in 0..500 {
        let errors = ErrorAggregator::new();
        errors.wrap(async { Err::<(), _>(1u8) });

        assert_eq!(timeout(WAIT, errors.next()).await.unwrap(), Some(1));
        assert!(errors.delivered() >= 1, "read an error that delivered() does not count");
    }
}

#[tokio::test]
async fn errors_pass_through_unmodified() {
    let errors = ErrorAggregator::new();
    let expected = ListenerError { port: 8080, reason: "address in use".to_owned() };

    let sent = expected.clone();
    errors.wrap(async move { Err::<(), _>(sent) });

    assert_eq!(timeout(WAIT, errors.next()).await.unwrap(), Some(expected));
}

#[tokio::test]
async fn option_output_counts_as_error() {
    let errors = ErrorAggregator::new();
    errors.wrap(async { None::<&str> });
    errors.wrap(async { Some("reported") });

    assert_eq!(timeout(WAIT, errors.next()).await.unwrap(), Some("reported"));
}

#[tokio::test]
async fn blocking_task_failure_is_delivered() {
    let errors = ErrorAggregator::new();
    errors.wrap_blocking(|| {
        std::fs::read_to_string("/definitely/not/a/real/path/errchan").map(|_| ())
    });

    let err = timeout(WAIT, errors.next()).await.unwrap().unwrap();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}

#[tokio::test]
async fn blocking_task_success_delivers_nothing() {
    let errors = ErrorAggregator::<String>::new();
    errors.wrap_blocking(|| Ok::<_, String>(2 + 2));

    timeout(WAIT, errors.wait_idle()).await.unwrap();
    assert_eq!(errors.try_next(), Err(TryNextError::Empty));
}

#[tokio::test]
async fn panicking_task_releases_its_slot() {
    let errors = ErrorAggregator::new();
    errors.wrap(explode());

    timeout(WAIT, errors.wait_idle()).await.unwrap();

    assert_eq!(errors.in_flight(), 0);
    assert_eq!(errors.delivered(), 0);
    assert_eq!(errors.try_next(), Err(TryNextError::Empty));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn wrap_from_many_tasks() {
    let config = AggregatorConfig::new().with_capacity(16);
    let errors = Arc::new(ErrorAggregator::<u32>::with_config(config));

    let mut spawners = Vec::new();
    for id in 0..8u32 {
        let errors = Arc::clone(&errors);
        spawners.push(tokio::spawn(async move {
            errors.wrap(async move { Err::<(), _>(id) });
        }));
    }
    for spawner in spawners {
        spawner.await.unwrap();
    }

    let mut seen = Vec::new();
    for _ in 0..8 {
        seen.push(timeout(WAIT, errors.next()).await.unwrap().unwrap());
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..8).collect::<Vec<_>>());
}

#[tokio::test]
async fn drop_newest_discards_overflow_without_waiting() {
    let errors = AggregatorConfig::new()
        .with_capacity(2)
        .with_overflow(Overflow::DropNewest)
        .build::<u32>();

    for id in 0..5 {
        errors.wrap(async move { Err::<(), _>(id) });
    }
    timeout(WAIT, errors.wait_idle()).await.unwrap();

    assert_eq!(errors.delivered(), 2);
    assert_eq!(errors.dropped(), 3);
    assert_eq!(errors.drain_ready().len(), 2);
}

#[tokio::test]
async fn waiting_producers_stay_parked_until_close() {
    let errors = ErrorAggregator::new();
    for id in 0..3u32 {
        errors.wrap(async move { Err::<(), _>(id) });
    }

    // One error fills the single slot; the other two producers wait for room.
    timeout(WAIT, async {
        while errors.in_flight() != 2 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
    assert_eq!(errors.delivered(), 1);

    timeout(WAIT, errors.close_and_wait()).await.unwrap();

    assert_eq!(errors.dropped(), 2);
    assert!(timeout(WAIT, errors.next()).await.unwrap().is_some());
    assert_eq!(timeout(WAIT, errors.next()).await.unwrap(), None);
}
