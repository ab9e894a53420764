//! Reusable rendezvous for a quorum that only ever shrinks.
//!
//! Arrivals and departures both go through one spinlock, so every call is
//! attributed to exactly one round: the round that is collecting arrivals when
//! the lock is taken. A departure therefore counts as an arrival for that round
//! and removes the participant from every later one.

use super::SpinLock;
use crate::concurrency::WaitStrategy;
use crate::shim::{AtomicUsize, Ordering};
use crossbeam_utils::CachePadded;

#[derive(Debug)]
struct Quorum {
    /// Arrivals still missing before the current round completes.
    remaining: usize,
    /// Participants that have not left; sizes each new round.
    participants: usize,
}

/// Outcome of a [`Barrier::rendezvous`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rendezvous {
    leader: bool,
    generation: usize,
}

impl Rendezvous {
    /// `true` for the one caller whose arrival completed the round.
    ///
    /// A round completed by [`Barrier::leave`] has no leader.
    #[inline]
    pub fn is_leader(&self) -> bool {
        self.leader
    }

    /// Number of rounds completed once this one was released.
    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }
}

/// A spinning n-party barrier whose quorum shrinks as participants leave.
///
/// No participant leaves round `g` before every participant still active in
/// round `g` has arrived at it or departed.
pub struct Barrier {
    quorum: SpinLock<Quorum>,
    generation: CachePadded<AtomicUsize>,
    wait: WaitStrategy,
}

impl Barrier {
    /// Creates a barrier for `participants` parties with the default wait strategy.
    pub fn new(participants: usize) -> Self {
        Self::with_strategy(participants, WaitStrategy::default())
    }

    /// Creates a barrier for `participants` parties that waits according to `wait`.
    pub fn with_strategy(participants: usize, wait: WaitStrategy) -> Self {
        Self {
            quorum: SpinLock::with_strategy(
                Quorum {
                    remaining: participants,
                    participants,
                },
                wait,
            ),
            generation: CachePadded::new(AtomicUsize::new(0)),
            wait,
        }
    }

    /// Arrives at the current round and spins until it completes.
    ///
    /// # Panics
    ///
    /// Panics if every participant has already left.
    pub fn rendezvous(&self) -> Rendezvous {
        let mut quorum = self.quorum.acquire();
        assert!(
            quorum.remaining > 0,
            "rendezvous on a barrier with no participants left"
        );
        let generation = self.generation.load(Ordering::Relaxed);
        quorum.remaining -= 1;
        if quorum.remaining == 0 {
            quorum.remaining = quorum.participants;
            self.generation.store(generation.wrapping_add(1), Ordering::Release);
            return Rendezvous {
                leader: true,
                generation: generation.wrapping_add(1),
            };
        }
        quorum.release();

        self.wait
            .wait_until(|| self.generation.load(Ordering::Acquire) != generation);
        Rendezvous {
            leader: false,
            generation: generation.wrapping_add(1),
        }
    }

    /// Permanently removes the caller from the quorum.
    ///
    /// Counts as an arrival for the round currently collecting arrivals, and
    /// every later round needs one arrival fewer. The caller must not call
    /// [`rendezvous`](Self::rendezvous) afterwards.
    ///
    /// # Panics
    ///
    /// Panics if every participant has already left.
    pub fn leave(&self) {
        let mut quorum = self.quorum.acquire();
        assert!(
            quorum.participants > 0,
            "leave on a barrier with no participants left"
        );
        quorum.participants -= 1;
        quorum.remaining -= 1;
        // With nobody left there is nobody to release.
        if quorum.remaining == 0 && quorum.participants > 0 {
            quorum.remaining = quorum.participants;
            let generation = self.generation.load(Ordering::Relaxed);
            self.generation.store(generation.wrapping_add(1), Ordering::Release);
        }
    }

    /// Participants that have not left.
    pub fn participants(&self) -> usize {
        self.quorum.acquire().participants
    }

    /// Number of completed rounds.
    pub fn generation(&self) -> usize {
        self.generation.load(Ordering::Acquire)
    }
}

impl core::fmt::Debug for Barrier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Barrier")
            .field("generation", &self.generation())
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}
