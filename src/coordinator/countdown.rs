//! Concurrent countdown: N expected signals, one release.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;
use tracing::warn;

/// Counts down from a fixed number of expected signals.
///
/// [`Countdown::signal`] may be called from any task or thread. Waiters are
/// released exactly once, when the count reaches zero. A countdown created
/// with zero is already set.
#[derive(Debug)]
pub struct Countdown {
    initial: usize,
    remaining: AtomicUsize,
    notify: Notify,
}

impl Countdown {
    /// Creates a countdown expecting `count` signals.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            initial: count,
            remaining: AtomicUsize::new(count),
            notify: Notify::new(),
        }
    }

    /// Returns the number of signals the countdown was created with.
    #[must_use]
    pub fn initial(&self) -> usize {
        self.initial
    }

    /// Returns the number of signals still outstanding.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::SeqCst)
    }

    /// Returns the number of signals received so far.
    #[must_use]
    pub fn signalled(&self) -> usize {
        self.initial - self.remaining()
    }

    /// Returns `true` once every expected signal has arrived.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.remaining() == 0
    }

    /// Records one signal. Returns `true` for the signal that released waiters.
    ///
    /// Signals beyond the expected count are ignored.
    pub fn signal(&self) -> bool {
        match self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        {
            Ok(1) => {
                self.notify.notify_waiters();
                true
            }
            Ok(_) => false,
            Err(_) => {
                warn!(initial = self.initial, "countdown signalled after reaching zero");
                false
            }
        }
    }

    /// Waits until the count reaches zero. Returns immediately if already set.
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking so a signal between check and await is not lost.
        notified.as_mut().enable();
        if self.is_set() {
            return;
        }
        notified.await;
    }

    /// Returns a guard that signals this countdown when dropped.
    #[must_use]
    pub fn guard(self: &Arc<Self>) -> SignalGuard {
        SignalGuard {
            countdown: Arc::clone(self),
        }
    }
}

/// Signals its [`Countdown`] exactly once, on drop.
#[derive(Debug)]
pub struct SignalGuard {
    countdown: Arc<Countdown>,
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.countdown.signal();
    }
}
