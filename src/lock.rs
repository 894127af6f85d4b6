// Copyright (c) 2026 rwspin contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The public lock type: a [`RawRwSpinLock`] paired with the data it
//! protects, in the style of `lock_api::RwLock` — except the guard surface
//! here is this crate's own bespoke one, not `lock_api`'s.

use core::cell::UnsafeCell;
use core::fmt;
use core::time::Duration;

use crate::guard::{ExclusiveGuard, SharedGuard};
use crate::raw::RawRwSpinLock;
use crate::width::AtomicState;

/// A reader-writer spin lock protecting a `T`.
///
/// See the crate-level documentation for the full contract. In short: not
/// fair, not reentrant, no writer priority, meant for very short critical
/// sections only.
pub struct RwSpinLock<T: ?Sized, A: AtomicState = crate::loom::atomic::AtomicI32> {
    raw: RawRwSpinLock<A>,
    data: UnsafeCell<T>,
}

unsafe impl<T: ?Sized + Send, A: AtomicState> Send for RwSpinLock<T, A> {}
unsafe impl<T: ?Sized + Send + Sync, A: AtomicState> Sync for RwSpinLock<T, A> {}

macro_rules! impl_const_new {
    ($atomic:ty) => {
        impl<T> RwSpinLock<T, $atomic> {
            /// Creates a new, unowned lock around `value`, suitable for a
            /// `static` or `const` initializer.
            #[must_use]
            pub const fn new(value: T) -> Self {
                Self {
                    raw: RawRwSpinLock::new(),
                    data: UnsafeCell::new(value),
                }
            }
        }
    };
}

impl_const_new!(crate::loom::atomic::AtomicI16);
impl_const_new!(crate::loom::atomic::AtomicI32);
impl_const_new!(crate::loom::atomic::AtomicI64);

impl<T, A: AtomicState> From<T> for RwSpinLock<T, A> {
    fn from(value: T) -> Self {
        Self {
            raw: RawRwSpinLock::default(),
            data: UnsafeCell::new(value),
        }
    }
}

impl<T: Default, A: AtomicState> Default for RwSpinLock<T, A> {
    fn default() -> Self {
        Self::from(T::default())
    }
}

impl<T: ?Sized, A: AtomicState> RwSpinLock<T, A> {
    pub(crate) fn raw(&self) -> &RawRwSpinLock<A> {
        &self.raw
    }

    pub(crate) fn data_ptr(&self) -> *mut T {
        self.data.get()
    }

    // ---- non-blocking entry points --------------------------------------

    /// Attempts to acquire the lock exclusively without blocking.
    pub fn try_exclusive(&self) -> Option<ExclusiveGuard<'_, T, A>> {
        self.raw.try_exclusive().then(|| ExclusiveGuard::new(self))
    }

    /// Attempts to acquire the lock in shared mode without blocking.
    pub fn try_share(&self) -> Option<SharedGuard<'_, T, A>> {
        self.raw.try_shared().then(|| SharedGuard::new(self))
    }

    // ---- blocking entry points -------------------------------------------

    /// Acquires the lock exclusively, blocking forever if necessary.
    ///
    /// `rounds`, if provided, receives the number of backoff rounds waited.
    pub fn exclusively(&self, rounds: Option<&mut u32>) -> ExclusiveGuard<'_, T, A> {
        self.raw.acquire_exclusive(rounds);
        ExclusiveGuard::new(self)
    }

    /// Acquires the lock exclusively, blocking up to `timeout`.
    ///
    /// Read the crate docs on timed guards before using this inside an
    /// `if`: you must bind the result with `if let Some(g) = ... { .. }` so
    /// the guard stays alive for the guarded body — a bare
    /// `if lock.try_exclusively_for(t, None).is_some() { .. }` drops the
    /// guard before the body runs.
    pub fn try_exclusively_for(
        &self,
        timeout: Duration,
        rounds: Option<&mut u32>,
    ) -> Option<ExclusiveGuard<'_, T, A>> {
        self.raw
            .acquire_exclusive_timeout(timeout, rounds)
            .then(|| ExclusiveGuard::new(self))
    }

    /// Acquires the lock in shared mode, blocking forever if necessary.
    ///
    /// `rounds`, if provided, receives the number of backoff rounds waited.
    pub fn share(&self, rounds: Option<&mut u32>) -> SharedGuard<'_, T, A> {
        self.raw.acquire_shared(rounds);
        SharedGuard::new(self)
    }

    /// Acquires the lock in shared mode, blocking up to `timeout`.
    ///
    /// See [`Self::try_exclusively_for`] for the `if let` binding discipline
    /// this entry point requires.
    pub fn try_share_for(
        &self,
        timeout: Duration,
        rounds: Option<&mut u32>,
    ) -> Option<SharedGuard<'_, T, A>> {
        self.raw
            .acquire_shared_timeout(timeout, rounds)
            .then(|| SharedGuard::new(self))
    }

    // ---- diagnostics (racy/advisory only) ---------------------------------

    /// Snapshot of whether the lock is held in any mode. Racy, advisory
    /// only.
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Snapshot of whether the lock is held exclusively. Racy, advisory
    /// only.
    pub fn is_locked_exclusively(&self) -> bool {
        self.raw.is_locked_exclusively()
    }

    /// Forcibly releases the lock as if the exclusive holder had released
    /// it. Recovery path only; calling this while a legitimate holder is
    /// still active corrupts the lock state.
    ///
    /// # Safety
    ///
    /// The caller must know that no live exclusive holder exists (e.g. it
    /// crashed without unwinding through `ExclusiveGuard::drop`).
    pub unsafe fn force_unlock(&self) {
        self.raw.force_unlock();
    }

    /// Returns a mutable reference to the protected data.
    ///
    /// Since this borrows the lock mutably, no locking needs to happen: the
    /// borrow checker already guarantees exclusive access.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }
}

impl<T, A: AtomicState> RwSpinLock<T, A> {
    /// Consumes the lock, returning the protected data.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized + fmt::Debug, A: AtomicState> fmt::Debug for RwSpinLock<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_share() {
            Some(guard) => f.debug_struct("RwSpinLock").field("data", &&*guard).finish(),
            None => {
                struct LockedPlaceholder;
                impl fmt::Debug for LockedPlaceholder {
                    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        f.write_str("<locked>")
                    }
                }
                f.debug_struct("RwSpinLock")
                    .field("data", &LockedPlaceholder)
                    .finish()
            }
        }
    }
}
