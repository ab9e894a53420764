//! Concurrency building blocks: wait strategies and spinning primitives.
//!
//! Nothing here parks a thread. Every wait is a poll loop shaped by a
//! [`WaitStrategy`].

pub mod sync;
pub mod wait;

pub use sync::{Barrier, Latch, Rendezvous, SpinLock, SpinLockGuard};
pub use wait::WaitStrategy;
