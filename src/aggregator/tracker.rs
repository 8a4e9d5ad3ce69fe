use std::sync::Arc;

use tokio::sync::watch;

/// Counts producers that have been spawned but have not finished.
#[derive(Debug)]
pub(crate) struct Tracker {
    count: watch::Sender<usize>,
}

impl Tracker {
    pub(crate) fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self { count }
    }

    /// Registers a producer. The slot is released when the guard drops,
    /// including when the producer panics.
    pub(crate) fn enter(self: &Arc<Self>) -> ProducerGuard {
        self.count.send_modify(|count| *count += 1);
        ProducerGuard { tracker: Arc::clone(self) }
    }

    pub(crate) fn in_flight(&self) -> usize {
        *self.count.borrow()
    }

    /// Resolves once no producer is running.
    pub(crate) async fn wait_idle(&self) {
        let mut count = self.count.subscribe();
        while *count.borrow_and_update() != 0 {
            if count.changed().await.is_err() {
                return;
            }
        }
    }
}

#[must_use]
pub(crate) struct ProducerGuard {
    tracker: Arc<Tracker>,
}

impl Drop for ProducerGuard {
    fn drop(&mut self) {
        self.tracker.count.send_modify(|count| *count = count.saturating_sub(1));
    }
}
