// Copyright (c) 2026 rwspin contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Scope guards: RAII handles that release on drop and integrate with
//! Rust's own scoping constructs (`if let`, ordinary block scope) rather
//! than any bespoke truthiness protocol.

use core::fmt;
use core::ops::{Deref, DerefMut};
use core::time::Duration;

use crate::lock::RwSpinLock;
use crate::width::AtomicState;

/// An RAII handle to an exclusively-held [`RwSpinLock`].
///
/// Dereferences to `&T` / `&mut T`. Releases the lock when dropped. Move-only:
/// copying would imply two holders of an exclusive lock at once.
#[must_use = "if unused the lock will immediately release"]
pub struct ExclusiveGuard<'a, T: ?Sized, A: AtomicState> {
    pub(crate) lock: &'a RwSpinLock<T, A>,
}

// Safety: an exclusive guard is the sole holder; sending it across threads
// is sound as long as `T` itself may be sent.
unsafe impl<T: ?Sized + Send, A: AtomicState> Send for ExclusiveGuard<'_, T, A> {}
unsafe impl<T: ?Sized + Sync, A: AtomicState> Sync for ExclusiveGuard<'_, T, A> {}

impl<'a, T: ?Sized, A: AtomicState> ExclusiveGuard<'a, T, A> {
    pub(crate) fn new(lock: &'a RwSpinLock<T, A>) -> Self {
        Self { lock }
    }

    /// Releases the lock early, equivalent to (but more explicit than)
    /// dropping the guard.
    pub fn release(self) {
        drop(self);
    }

    /// Atomically downgrades this exclusive hold to a single shared hold.
    ///
    /// A concurrent reader can never observe the lock as unowned in
    /// between.
    pub fn downgrade(self) -> SharedGuard<'a, T, A> {
        let lock = self.lock;
        lock.raw().downgrade_to_shared();
        core::mem::forget(self);
        SharedGuard::new(lock)
    }

    /// Releases the lock for the duration of the returned sub-guard's
    /// lifetime, re-acquiring exclusively (indefinitely) when it drops.
    ///
    /// `rounds`, if provided, receives the round count the re-acquisition
    /// waited, written when the sub-guard's scope ends, not when this method
    /// returns.
    pub fn temporarily_unlock<'r>(
        &mut self,
        rounds: Option<&'r mut u32>,
    ) -> ExclusiveUnlocked<'_, 'r, T, A> {
        self.lock.raw().release_exclusive();
        ExclusiveUnlocked {
            lock: self.lock,
            rounds,
        }
    }
}

impl<T: ?Sized, A: AtomicState> Deref for ExclusiveGuard<'_, T, A> {
    type Target = T;
    fn deref(&self) -> &T {
        // Safety: an ExclusiveGuard is the unique holder of the lock.
        unsafe { &*self.lock.data_ptr() }
    }
}

impl<T: ?Sized, A: AtomicState> DerefMut for ExclusiveGuard<'_, T, A> {
    fn deref_mut(&mut self) -> &mut T {
        // Safety: an ExclusiveGuard is the unique holder of the lock.
        unsafe { &mut *self.lock.data_ptr() }
    }
}

impl<T: ?Sized, A: AtomicState> Drop for ExclusiveGuard<'_, T, A> {
    fn drop(&mut self) {
        self.lock.raw().release_exclusive();
    }
}

impl<T: ?Sized + fmt::Debug, A: AtomicState> fmt::Debug for ExclusiveGuard<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// A sub-scope created by [`ExclusiveGuard::temporarily_unlock`]. The lock
/// is *not* held while this value is alive; dropping it re-acquires
/// exclusively (indefinitely) and, if a `rounds` out-parameter was supplied,
/// writes the round count it waited.
#[must_use = "dropping this immediately re-acquires the lock"]
pub struct ExclusiveUnlocked<'g, 'r, T: ?Sized, A: AtomicState> {
    lock: &'g RwSpinLock<T, A>,
    rounds: Option<&'r mut u32>,
}

impl<T: ?Sized, A: AtomicState> Drop for ExclusiveUnlocked<'_, '_, T, A> {
    fn drop(&mut self) {
        self.lock.raw().acquire_exclusive(self.rounds.take());
    }
}

/// An RAII handle to a shared hold on an [`RwSpinLock`].
///
/// Dereferences to `&T` only. `Clone` acquires an additional shared
/// reference (blocking indefinitely, like [`RwSpinLock::share`]) rather than
/// duplicating a handle to the same reference.
#[must_use = "if unused the lock will immediately release"]
pub struct SharedGuard<'a, T: ?Sized, A: AtomicState> {
    lock: &'a RwSpinLock<T, A>,
}

unsafe impl<T: ?Sized + Sync, A: AtomicState> Send for SharedGuard<'_, T, A> {}
unsafe impl<T: ?Sized + Sync, A: AtomicState> Sync for SharedGuard<'_, T, A> {}

impl<'a, T: ?Sized, A: AtomicState> SharedGuard<'a, T, A> {
    pub(crate) fn new(lock: &'a RwSpinLock<T, A>) -> Self {
        Self { lock }
    }

    /// Releases the shared hold early, equivalent to dropping the guard.
    pub fn release(self) {
        drop(self);
    }

    /// Attempts to upgrade this shared hold to exclusive without blocking.
    ///
    /// On success the shared hold is consumed and replaced by the returned
    /// [`UpgradedGuard`]. On failure `self` is returned unchanged: it is
    /// still a live, held shared guard, since the attempt never released
    /// it.
    pub fn try_upgrade(self) -> Result<UpgradedGuard<'a, T, A>, Self> {
        if self.lock.raw().try_upgrade() {
            let lock = self.lock;
            core::mem::forget(self);
            Ok(UpgradedGuard::new(lock))
        } else {
            Err(self)
        }
    }

    /// Attempts to upgrade this shared hold to exclusive, blocking up to
    /// `timeout`. There is deliberately no indefinite variant, for the same
    /// reason [`crate::RawRwSpinLock::upgrade_timeout`] has none.
    pub fn upgrade_timeout(
        self,
        timeout: Duration,
        rounds: Option<&mut u32>,
    ) -> Result<UpgradedGuard<'a, T, A>, Self> {
        if self.lock.raw().upgrade_timeout(timeout, rounds) {
            let lock = self.lock;
            core::mem::forget(self);
            Ok(UpgradedGuard::new(lock))
        } else {
            Err(self)
        }
    }

    /// Releases the shared hold for the duration of the returned sub-guard's
    /// lifetime, re-acquiring shared (indefinitely) when it drops.
    pub fn temporarily_unlock<'r>(
        &mut self,
        rounds: Option<&'r mut u32>,
    ) -> SharedUnlocked<'_, 'r, T, A> {
        self.lock.raw().release_shared();
        SharedUnlocked {
            lock: self.lock,
            rounds,
        }
    }
}

impl<T: ?Sized, A: AtomicState> Clone for SharedGuard<'_, T, A> {
    fn clone(&self) -> Self {
        self.lock.raw().acquire_shared(None);
        Self { lock: self.lock }
    }
}

impl<T: ?Sized, A: AtomicState> Deref for SharedGuard<'_, T, A> {
    type Target = T;
    fn deref(&self) -> &T {
        // Safety: a SharedGuard holds at least one shared reference, which
        // excludes any exclusive holder.
        unsafe { &*self.lock.data_ptr() }
    }
}

impl<T: ?Sized, A: AtomicState> Drop for SharedGuard<'_, T, A> {
    fn drop(&mut self) {
        self.lock.raw().release_shared();
    }
}

impl<T: ?Sized + fmt::Debug, A: AtomicState> fmt::Debug for SharedGuard<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// A sub-scope created by [`SharedGuard::temporarily_unlock`]. Dropping it
/// re-acquires shared (indefinitely) and, if supplied, writes the `rounds`
/// it waited.
#[must_use = "dropping this immediately re-acquires the lock"]
pub struct SharedUnlocked<'g, 'r, T: ?Sized, A: AtomicState> {
    lock: &'g RwSpinLock<T, A>,
    rounds: Option<&'r mut u32>,
}

impl<T: ?Sized, A: AtomicState> Drop for SharedUnlocked<'_, '_, T, A> {
    fn drop(&mut self) {
        self.lock.raw().acquire_shared(self.rounds.take());
    }
}

/// An RAII handle produced by upgrading a [`SharedGuard`] to exclusive.
///
/// Dereferences to `&T` / `&mut T`, same as [`ExclusiveGuard`]. Dropping it
/// downgrades back to shared, restoring the invariant that the originating
/// shared acquisition is still held.
/// Move-only.
#[must_use = "if unused the lock will immediately downgrade back to shared"]
pub struct UpgradedGuard<'a, T: ?Sized, A: AtomicState> {
    lock: &'a RwSpinLock<T, A>,
}

unsafe impl<T: ?Sized + Send, A: AtomicState> Send for UpgradedGuard<'_, T, A> {}
unsafe impl<T: ?Sized + Sync, A: AtomicState> Sync for UpgradedGuard<'_, T, A> {}

impl<'a, T: ?Sized, A: AtomicState> UpgradedGuard<'a, T, A> {
    fn new(lock: &'a RwSpinLock<T, A>) -> Self {
        Self { lock }
    }

    /// Downgrades back to shared early, equivalent to dropping the guard,
    /// returning the resulting [`SharedGuard`].
    pub fn release(self) -> SharedGuard<'a, T, A> {
        let lock = self.lock;
        core::mem::forget(self);
        lock.raw().downgrade_to_shared();
        SharedGuard::new(lock)
    }
}

impl<T: ?Sized, A: AtomicState> Deref for UpgradedGuard<'_, T, A> {
    type Target = T;
    fn deref(&self) -> &T {
        // Safety: an UpgradedGuard holds the lock exclusively.
        unsafe { &*self.lock.data_ptr() }
    }
}

impl<T: ?Sized, A: AtomicState> DerefMut for UpgradedGuard<'_, T, A> {
    fn deref_mut(&mut self) -> &mut T {
        // Safety: an UpgradedGuard holds the lock exclusively.
        unsafe { &mut *self.lock.data_ptr() }
    }
}

impl<T: ?Sized, A: AtomicState> Drop for UpgradedGuard<'_, T, A> {
    fn drop(&mut self) {
        self.lock.raw().downgrade_to_shared();
    }
}

impl<T: ?Sized + fmt::Debug, A: AtomicState> fmt::Debug for UpgradedGuard<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
