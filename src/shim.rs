//! Atomics and cells used by the synchronization primitives.
//!
//! With the `loom` feature the primitives are built on loom's model-checked
//! types so `tests/loom.rs` can explore their interleavings. Otherwise they use
//! `core` directly and the cell wrapper below compiles down to nothing.

#[cfg(feature = "loom")]
mod imp {
    pub(crate) use loom::{
        cell::UnsafeCell,
        sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering},
    };

    /// Loom only explores other threads at explicit yield points.
    #[inline]
    pub(crate) fn relax() {
        loom::thread::yield_now();
    }
}

#[cfg(not(feature = "loom"))]
mod imp {
    pub(crate) use core::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

    /// `core::cell::UnsafeCell` with loom's closure-based access API.
    #[derive(Debug)]
    #[repr(transparent)]
    pub(crate) struct UnsafeCell<T>(core::cell::UnsafeCell<T>);

    impl<T> UnsafeCell<T> {
        #[inline(always)]
        pub(crate) const fn new(value: T) -> Self {
            Self(core::cell::UnsafeCell::new(value))
        }

        #[inline(always)]
        pub(crate) fn with<R>(&self, f: impl FnOnce(*const T) -> R) -> R {
            f(self.0.get())
        }

        #[inline(always)]
        pub(crate) fn with_mut<R>(&self, f: impl FnOnce(*mut T) -> R) -> R {
            f(self.0.get())
        }
    }
}

pub(crate) use imp::*;
