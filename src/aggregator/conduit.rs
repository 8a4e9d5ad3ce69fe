//! Guarded sending half of the aggregator's channel.
//!
//! Every send happens while holding the state guard and after observing
//! [`State::Open`], so a delivery and [`Conduit::close`] are strictly ordered:
//! either the error is in the channel before closure, or the delivery sees
//! `Closed` and discards it.

use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};

use crate::config::Overflow;

/// Locks `mutex`, recovering the data if a previous holder panicked.
///
/// None of the guarded sections leave their data half-updated, so a poisoned
/// lock is still consistent.
#[inline]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

enum State<E> {
    Open(mpsc::Sender<E>),
    Closed,
}

pub(crate) struct Conduit<E> {
    state: Mutex<State<E>>,
    closed: watch::Sender<bool>,
    overflow: Overflow,
    delivered: AtomicUsize,
    dropped: AtomicUsize,
}

impl<E> Conduit<E> {
    pub(crate) fn new(sender: mpsc::Sender<E>, overflow: Overflow) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            state: Mutex::new(State::Open(sender)),
            closed,
            overflow,
            delivered: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Transitions to `Closed` and drops the sender.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub(crate) fn close(&self) -> bool {
        let previous = core::mem::replace(&mut *lock(&self.state), State::Closed);
        let was_open = matches!(previous, State::Open(_));
        drop(previous);

        if was_open {
            self.closed.send_replace(true);
        }
        was_open
    }

    pub(crate) fn is_closed(&self) -> bool {
        matches!(*lock(&self.state), State::Closed)
    }

    pub(crate) fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    pub(crate) fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    fn sender(&self) -> Option<mpsc::Sender<E>> {
        match &*lock(&self.state) {
            State::Open(sender) => Some(sender.clone()),
            State::Closed => None,
        }
    }

    fn discard(&self, error: E) {
        drop(error);
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    fn discard_closed(&self, error: E) {
        self.discard(error);
        #[cfg(feature = "tracing")]
        tracing::debug!("error aggregator closed, dropped a task error");
    }

    /// Resolves once [`close`](Self::close) has been called.
    async fn closed(&self) {
        let mut closed = self.closed.subscribe();
        while !*closed.borrow_and_update() {
            if closed.changed().await.is_err() {
                return;
            }
        }
    }

    /// Attempts to place `error` on the channel.
    ///
    /// With [`Overflow::Wait`] this waits for room in the channel or for
    /// closure, whichever comes first; closure wins when both are ready.
    pub(crate) async fn deliver(&self, error: E) {
        let Some(sender) = self.sender() else {
            return self.discard_closed(error);
        };

        let permit = match self.overflow {
            Overflow::Wait => {
                tokio::select! {
                    biased;
                    () = self.closed() => None,
                    permit = sender.reserve() => permit.ok(),
                }
            },
            Overflow::DropNewest => match sender.try_reserve() {
                Ok(permit) => Some(permit),
                Err(TrySendError::Full(())) => {
                    self.discard(error);
                    #[cfg(feature = "tracing")]
                    tracing::debug!("error aggregator channel full, dropped a task error");
                    return;
                },
                Err(TrySendError::Closed(())) => None,
            },
        };

        let Some(permit) = permit else {
            return self.discard_closed(error);
        };

        let state = lock(&self.state);
        if matches!(*state, State::Closed) {
            drop(state);
            drop(permit);
            return self.discard_closed(error);
        }
        // A reader must never observe an error the counter does not include.
        self.delivered.fetch_add(1, Ordering::Relaxed);
        permit.send(error);
        drop(state);

        #[cfg(feature = "tracing")]
        tracing::trace!("error aggregator delivered a task error");
    }
}
