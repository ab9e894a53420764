//! Single-slot handshake between two adjacent stages.
//!
//! A latch holds at most one [`Token`]. The producer may only store into an
//! empty slot and the consumer may only take from a full one; each side spins
//! until the other has done its half. Payloads are moved in and out, never
//! inspected.

use crate::concurrency::WaitStrategy;
use crate::shim::{AtomicU8, Ordering, UnsafeCell};
use crate::token::{Placeholder, Token};
use crossbeam_utils::CachePadded;

const EMPTY: u8 = 0;
const WRITING: u8 = 1;
const READY: u8 = 2;
const READING: u8 = 3;

/// A single-producer, single-consumer slot with a ready flag.
///
/// The flag alternates strictly between empty and ready. `WRITING` and
/// `READING` are transient claims that keep two producers (or two consumers)
/// from touching the slot at once if the one-per-side contract is broken.
pub struct Latch<T> {
    state: CachePadded<AtomicU8>,
    slot: UnsafeCell<Option<Token<T>>>,
    placeholder: Placeholder,
    wait: WaitStrategy,
}

// Safety: the slot is only accessed by the thread that won the transient claim.
unsafe impl<T: Send> Send for Latch<T> {}
unsafe impl<T: Send> Sync for Latch<T> {}

impl<T> Latch<T> {
    /// Creates an empty latch with a `Noop` placeholder.
    pub fn new() -> Self {
        Self::with_strategy(WaitStrategy::default())
    }

    /// Creates an empty latch that waits according to `wait`.
    pub fn with_strategy(wait: WaitStrategy) -> Self {
        Self {
            state: CachePadded::new(AtomicU8::new(EMPTY)),
            slot: UnsafeCell::new(None),
            placeholder: Placeholder::Noop,
            wait,
        }
    }

    /// Creates a latch that already holds `token`, ready to be consumed.
    pub fn primed(token: Token<T>, wait: WaitStrategy) -> Self {
        let latch = Self::with_strategy(wait);
        // Safety: not shared yet.
        latch.slot.with_mut(|slot| unsafe { *slot = Some(token) });
        latch.state.store(READY, Ordering::Release);
        latch
    }

    /// Replaces whatever the latch holds with a ready `token`.
    ///
    /// Requires `&mut self`, so no handshake can be in flight.
    pub fn prime(&mut self, token: Token<T>) {
        // Safety: `&mut self` excludes every other accessor.
        self.slot.with_mut(|slot| unsafe { *slot = Some(token) });
        self.state.store(READY, Ordering::Release);
    }

    /// Sets what the owning stage re-emits when its own input was `Noop`.
    pub fn set_noop_placeholder(&mut self, placeholder: Placeholder) {
        self.placeholder = placeholder;
    }

    /// The configured noop placeholder.
    #[inline]
    pub fn noop_placeholder(&self) -> Placeholder {
        self.placeholder
    }

    /// Returns `true` when a token is waiting to be consumed.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state.load(Ordering::Acquire) == READY
    }

    /// Spins until a token is ready, then takes it and empties the slot.
    pub fn consume(&self) -> Token<T> {
        self.wait.wait_until(|| self.claim(READY, READING));
        // Safety: the READING claim is exclusive and the producer's release
        // store of READY happened before our acquire.
        let token = self.slot.with_mut(|slot| unsafe { (*slot).take() });
        self.state.store(EMPTY, Ordering::Release);
        match token {
            Some(token) => token,
            // A READY flag always covers a filled slot.
            None => unreachable!("latch flagged ready with an empty slot"),
        }
    }

    /// Spins until the slot is empty, then stores `token` and flags it ready.
    pub fn produce(&self, token: Token<T>) {
        self.wait.wait_until(|| self.claim(EMPTY, WRITING));
        // Safety: the WRITING claim is exclusive.
        self.slot.with_mut(|slot| unsafe { *slot = Some(token) });
        self.state.store(READY, Ordering::Release);
    }

    /// Produces the placeholder configured for a skipped cycle.
    #[inline]
    pub fn produce_placeholder(&self) {
        self.produce(self.placeholder.into());
    }

    #[inline]
    fn claim(&self, from: u8, to: u8) -> bool {
        self.state.load(Ordering::Relaxed) == from
            && self
                .state
                .compare_exchange(from, to, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
    }
}

impl<T> Default for Latch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> core::fmt::Debug for Latch<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Latch")
            .field("ready", &self.is_ready())
            .field("placeholder", &self.placeholder)
            .finish_non_exhaustive()
    }
}
