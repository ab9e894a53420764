//! Spinning synchronization primitives behind the pipeline driver.
//!
//! - [`SpinLock`]: busy-wait mutual exclusion over one flag.
//! - [`Latch`]: single-slot token handshake between adjacent stages.
//! - [`Barrier`]: reusable rendezvous for a quorum that shrinks as parties leave.

pub mod barrier;
pub mod latch;
pub mod spinlock;

pub use barrier::{Barrier, Rendezvous};
pub use latch::Latch;
pub use spinlock::{SpinLock, SpinLockGuard};
