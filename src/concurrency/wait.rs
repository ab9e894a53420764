//! Busy-wait strategies shared by the latch, spinlock and barrier.
//!
//! Every suspension point in the engine spins: nothing parks on the OS. The
//! strategy only decides what a thread does between two polls.

use crossbeam_utils::Backoff;
use serde::{Deserialize, Serialize};

/// How a spinning thread burns time between two polls of a condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitStrategy {
    /// Pure busy-wait with `spin_loop` hints.
    ///
    /// Lowest hand-off latency, but wants a dedicated core per waiting thread.
    Spin,
    /// Exponential spinning that escalates to `thread::yield_now`.
    ///
    /// Still a busy-wait; it merely stays polite when stages outnumber cores.
    #[default]
    Backoff,
}

impl WaitStrategy {
    /// Polls `attempt` until it yields a value.
    #[inline]
    pub(crate) fn wait_for<R>(self, mut attempt: impl FnMut() -> Option<R>) -> R {
        if let Some(value) = attempt() {
            return value;
        }
        self.wait_for_slow(attempt)
    }

    #[cold]
    fn wait_for_slow<R>(self, mut attempt: impl FnMut() -> Option<R>) -> R {
        let backoff = Backoff::new();
        loop {
            self.pause(&backoff);
            if let Some(value) = attempt() {
                return value;
            }
        }
    }

    /// Polls `ready` until it returns `true`.
    #[inline]
    pub(crate) fn wait_until(self, mut ready: impl FnMut() -> bool) {
        self.wait_for(|| ready().then_some(()));
    }

    #[cfg(feature = "loom")]
    #[inline]
    fn pause(self, _backoff: &Backoff) {
        crate::shim::relax();
    }

    #[cfg(not(feature = "loom"))]
    #[inline]
    fn pause(self, backoff: &Backoff) {
        match self {
            WaitStrategy::Spin => core::hint::spin_loop(),
            WaitStrategy::Backoff => backoff.snooze(),
        }
    }
}
