#![cfg(not(feature = "loom"))]

use lockstep::concurrency::{Barrier, Latch, SpinLock, WaitStrategy};
use lockstep::{Placeholder, Token};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[test]
fn test_barrier_shrinks_with_staggered_departures() {
    const PARTIES: usize = 4;
    const STEP: usize = 25;
    let barrier = Barrier::new(PARTIES);
    let leaders = AtomicUsize::new(0);

    thread::scope(|s| {
        for party in 0..PARTIES {
            let barrier = &barrier;
            let leaders = &leaders;
            s.spawn(move || {
                let rounds = (party + 1) * STEP;
                for round in 1..=rounds {
                    let rendezvous = barrier.rendezvous();
                    // Every round up to our departure counts us in, in order.
                    assert_eq!(rendezvous.generation(), round);
                    if rendezvous.is_leader() {
                        leaders.fetch_add(1, Ordering::Relaxed);
                    }
                }
                barrier.leave();
            });
        }
    });

    assert_eq!(barrier.generation(), PARTIES * STEP);
    assert_eq!(barrier.participants(), 0);
    assert!(leaders.load(Ordering::Relaxed) <= PARTIES * STEP);
}

#[test]
fn test_barrier_with_spin_strategy() {
    let barrier = Barrier::with_strategy(3, WaitStrategy::Spin);
    thread::scope(|s| {
        for _ in 0..3 {
            s.spawn(|| {
                for _ in 0..100 {
                    barrier.rendezvous();
                }
                barrier.leave();
            });
        }
    });
    assert_eq!(barrier.generation(), 100);
}

#[test]
fn test_latch_ring_passes_tokens_around() {
    // Three threads in a ring, each incrementing the value it receives.
    const HOPS: u32 = 300;
    let latches: Vec<Latch<u32>> = (0..3).map(|_| Latch::new()).collect();
    latches[2].produce(Token::Payload(0));

    thread::scope(|s| {
        for i in 0..3 {
            let input = &latches[(i + 2) % 3];
            let output = &latches[i];
            s.spawn(move || loop {
                match input.consume() {
                    Token::Payload(v) if v >= HOPS => {
                        output.produce(Token::Terminate);
                        break;
                    }
                    Token::Payload(v) => output.produce(Token::Payload(v + 1)),
                    Token::Terminate => {
                        output.produce(Token::Terminate);
                        break;
                    }
                    other => panic!("unexpected {other:?}"),
                }
            });
        }
    });

    // Two stoppers forwarded Terminate; the last one's Terminate is still parked.
    let parked: Vec<_> = latches.iter().filter(|l| l.is_ready()).collect();
    assert_eq!(parked.len(), 1);
    assert_eq!(parked[0].consume(), Token::Terminate);
}

#[test]
fn test_primed_latch_reemits_its_placeholder() {
    let mut latch: Latch<u8> = Latch::primed(Token::Bootstrap, WaitStrategy::Spin);
    latch.set_noop_placeholder(Placeholder::Bootstrap);
    assert_eq!(latch.consume(), Token::Bootstrap);
    latch.produce_placeholder();
    assert_eq!(latch.consume(), Token::Bootstrap);
}

#[test]
fn test_spinlock_guards_a_shared_vec() {
    let lock = SpinLock::new(Vec::new());
    thread::scope(|s| {
        for t in 0..4 {
            let lock = &lock;
            s.spawn(move || {
                for i in 0..250 {
                    let mut guard = lock.acquire();
                    guard.push(t * 1000 + i);
                    guard.release();
                }
            });
        }
    });
    let mut values = lock.acquire().clone();
    values.sort_unstable();
    assert_eq!(values.len(), 1000);
    values.dedup();
    assert_eq!(values.len(), 1000);
}
