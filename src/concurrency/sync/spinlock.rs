//! Busy-wait mutual exclusion.

use crate::concurrency::WaitStrategy;
use crate::shim::{AtomicBool, Ordering, UnsafeCell};
use core::ops::{Deref, DerefMut};

/// A busy-waiting mutual-exclusion lock over a single flag.
///
/// No fairness, no timeout, no parking: [`acquire`](Self::acquire) polls the
/// flag until it wins it. Meant for critical sections a few instructions long,
/// such as the barrier's quorum bookkeeping.
pub struct SpinLock<T> {
    locked: AtomicBool,
    value: UnsafeCell<T>,
    wait: WaitStrategy,
}

// Safety: the flag hands out exclusive access to `value` one guard at a time.
unsafe impl<T: Send> Send for SpinLock<T> {}
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    /// Creates an unlocked spinlock using the default wait strategy.
    pub fn new(value: T) -> Self {
        Self::with_strategy(value, WaitStrategy::default())
    }

    /// Creates an unlocked spinlock that waits according to `wait`.
    pub fn with_strategy(value: T, wait: WaitStrategy) -> Self {
        Self {
            locked: AtomicBool::new(false),
            value: UnsafeCell::new(value),
            wait,
        }
    }

    /// Spins until the lock is owned by the caller.
    #[inline]
    pub fn acquire(&self) -> SpinLockGuard<'_, T> {
        self.wait.wait_for(|| self.try_acquire())
    }

    /// Takes the lock if it is free, without spinning.
    #[inline]
    pub fn try_acquire(&self) -> Option<SpinLockGuard<'_, T>> {
        // Test before test-and-set keeps the cache line shared while contended.
        if self.locked.load(Ordering::Relaxed) {
            return None;
        }
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| SpinLockGuard { lock: self })
    }

    /// Returns `true` while some guard is alive.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}

impl<T: Default> Default for SpinLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> core::fmt::Debug for SpinLock<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpinLock")
            .field("locked", &self.is_locked())
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}

/// Exclusive access to a [`SpinLock`]'s value. Dropping it releases the lock.
pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<T> SpinLockGuard<'_, T> {
    /// Releases the lock. Same as dropping the guard.
    #[inline]
    pub fn release(self) {}
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Safety: the guard is the only holder of the flag.
        self.lock.value.with(|ptr| unsafe { &*ptr })
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // Safety: as above, and `&mut self` rules out a second borrow through this guard.
        self.lock.value.with_mut(|ptr| unsafe { &mut *ptr })
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}
