// Copyright (c) 2026 rwspin contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The acquisition engine: try-once primitives, release primitives, and the
//! spinning wrappers that retry a try-once against the adaptive backoff
//! schedule with an optional deadline.

use core::time::Duration;
use std::time::Instant;

use crate::backoff::{BackoffPolicy, ExclusivePolicy, SharedPolicy, UpgradePolicy, next_round, spin_round};
use crate::loom::atomic::Ordering;
use crate::loom::thread;
use crate::width::AtomicState;

/// The bare lock primitive: a single atomic state cell with no protected
/// data attached.
///
/// Most callers want [`crate::RwSpinLock`], which pairs this with an
/// `UnsafeCell<T>` and hands out scope guards. `RawRwSpinLock` is exposed
/// directly for callers who manage the protected memory themselves — for
/// example because it lives in a `shmem` segment shared with another
/// process, outside any single process's allocator.
pub struct RawRwSpinLock<A: AtomicState> {
    state: A,
}

// `AtomicState::new` is not `const` (trait methods can't be, on stable), so
// each width gets its own const constructor instead of a blanket one.
macro_rules! impl_const_new {
    ($atomic:ty) => {
        impl RawRwSpinLock<$atomic> {
            /// A lock in the unowned state (state = 0), suitable for a
            /// `static` or `const` initializer.
            #[must_use]
            pub const fn new() -> Self {
                Self {
                    state: <$atomic>::new(0),
                }
            }
        }
    };
}

impl_const_new!(crate::loom::atomic::AtomicI16);
impl_const_new!(crate::loom::atomic::AtomicI32);
impl_const_new!(crate::loom::atomic::AtomicI64);

impl<A: AtomicState> Default for RawRwSpinLock<A> {
    fn default() -> Self {
        Self {
            state: A::new(A::UNOWNED),
        }
    }
}

impl<A: AtomicState> RawRwSpinLock<A> {
    // ---- try-once primitives --------------------------------------------

    /// Attempts to acquire the lock exclusively without blocking.
    ///
    /// Performs a cheap non-atomic short-circuit read first: if the lock is
    /// obviously held, this returns `false` without touching the bus. The
    /// `compare_exchange` that follows is authoritative.
    #[inline]
    pub fn try_exclusive(&self) -> bool {
        // The short-circuit load is intentionally relaxed and non-authoritative;
        // the CAS below is what actually decides the outcome.
        if self.state.load(Ordering::Relaxed) != A::UNOWNED {
            return false;
        }
        self.state
            .compare_exchange(
                A::UNOWNED,
                A::EXCLUSIVE,
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .is_ok()
    }

    /// Attempts to acquire the lock in shared mode without blocking.
    ///
    /// A spurious failure (another reader incremented between the read and
    /// the `compare_exchange`) is reported as plain failure; retrying is the
    /// caller's responsibility, performed automatically by
    /// [`Self::acquire_shared`]/[`Self::acquire_shared_timeout`].
    #[inline]
    pub fn try_shared(&self) -> bool {
        let observed = self.state.load(Ordering::Relaxed);
        if observed == A::EXCLUSIVE {
            return false;
        }
        if observed >= A::MAX_SHARED {
            panic!("rwspin: too many shared holders, cannot safely proceed");
        }
        self.state
            .compare_exchange(
                observed,
                A::succ(observed),
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .is_ok()
    }

    /// Attempts to upgrade a held shared acquisition to exclusive without
    /// blocking.
    ///
    /// # Safety contract
    ///
    /// The caller must currently hold exactly one shared acquisition of
    /// this lock. Calling this while holding zero, or more than one,
    /// shared references is a contract violation and is not detected.
    #[inline]
    pub fn try_upgrade(&self) -> bool {
        self.state
            .compare_exchange(
                A::SHARED_ONE,
                A::EXCLUSIVE,
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .is_ok()
    }

    // ---- release primitives ---------------------------------------------

    /// Releases a held exclusive acquisition.
    #[inline]
    pub fn release_exclusive(&self) {
        debug_assert_eq!(
            self.state.load(Ordering::Relaxed),
            A::EXCLUSIVE,
            "release_exclusive called without holding the exclusive lock"
        );
        self.state.exchange(A::UNOWNED, Ordering::Release);
    }

    /// Releases one held shared acquisition.
    #[inline]
    pub fn release_shared(&self) {
        debug_assert!(
            {
                let observed = self.state.load(Ordering::Relaxed);
                observed != A::UNOWNED && observed != A::EXCLUSIVE
            },
            "release_shared called without holding a shared acquisition"
        );
        self.state.decrement(Ordering::Release);
    }

    /// Downgrades a held exclusive acquisition to a single shared
    /// acquisition, atomically: no writer can observe the lock as unowned
    /// in between, so a concurrent reader arriving at exactly the right
    /// moment never sees a gap in ownership.
    ///
    /// # Safety contract
    ///
    /// The caller must currently hold the exclusive lock.
    #[inline]
    pub fn downgrade_to_shared(&self) {
        debug_assert_eq!(
            self.state.load(Ordering::Relaxed),
            A::EXCLUSIVE,
            "downgrade_to_shared called without holding the exclusive lock"
        );
        self.state.exchange(A::SHARED_ONE, Ordering::Release);
    }

    /// Forcibly releases the lock as if an exclusive holder had released it.
    ///
    /// Documented recovery path only: intended for the case where a holder
    /// has crashed (or otherwise will never call `release_exclusive`) and no
    /// other holder exists. Calling this while a legitimate holder is still
    /// active is a contract violation.
    #[inline]
    pub fn force_unlock(&self) {
        #[cfg(feature = "log")]
        log::warn!("rwspin: force_unlock invoked, treating prior holder as crashed");
        self.release_exclusive();
    }

    // ---- diagnostic queries (racy/advisory only) ------------------------

    /// Snapshot of whether the lock is held in any mode. Racy: the result
    /// may be stale by the time the caller observes it. Advisory only.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) != A::UNOWNED
    }

    /// Snapshot of whether the lock is held exclusively. Racy: the result
    /// may be stale by the time the caller observes it. Advisory only.
    #[inline]
    pub fn is_locked_exclusively(&self) -> bool {
        self.state.load(Ordering::Relaxed) == A::EXCLUSIVE
    }

    // ---- spinning wrappers -----------------------------------------------

    /// Blocks until the lock is acquired exclusively. Never fails; may
    /// block forever if the current holder never releases.
    pub fn acquire_exclusive(&self, rounds: Option<&mut u32>) {
        acquire_indefinite::<ExclusivePolicy>(|| self.try_exclusive(), rounds);
    }

    /// Blocks until the lock is acquired exclusively or `timeout` elapses.
    pub fn acquire_exclusive_timeout(&self, timeout: Duration, rounds: Option<&mut u32>) -> bool {
        acquire_timed::<ExclusivePolicy>(|| self.try_exclusive(), timeout, rounds)
    }

    /// Blocks until the lock is acquired in shared mode. Never fails; may
    /// block forever under sustained exclusive contention.
    pub fn acquire_shared(&self, rounds: Option<&mut u32>) {
        acquire_indefinite::<SharedPolicy>(|| self.try_shared(), rounds);
    }

    /// Blocks until the lock is acquired in shared mode or `timeout`
    /// elapses.
    pub fn acquire_shared_timeout(&self, timeout: Duration, rounds: Option<&mut u32>) -> bool {
        acquire_timed::<SharedPolicy>(|| self.try_shared(), timeout, rounds)
    }

    /// Blocks until a held shared acquisition is upgraded to exclusive, or
    /// `timeout` elapses. There is deliberately no indefinite variant: an
    /// upgrade that never succeeds usually means another reader is also
    /// trying to upgrade, which is better surfaced to the caller than spun
    /// on forever.
    ///
    /// # Safety contract
    ///
    /// The caller must currently hold exactly one shared acquisition.
    pub fn upgrade_timeout(&self, timeout: Duration, rounds: Option<&mut u32>) -> bool {
        acquire_timed::<UpgradePolicy>(|| self.try_upgrade(), timeout, rounds)
    }
}

/// The indefinite acquire loop shared by every mode.
fn acquire_indefinite<P: BackoffPolicy>(mut try_once: impl FnMut() -> bool, rounds: Option<&mut u32>) {
    let mut r = 0u32;
    let mut rounds = rounds;
    loop {
        if try_once() {
            if let Some(out) = rounds {
                *out = r;
            }
            return;
        }
        r = next_round(r);
        spin_round::<P>(r);
    }
}

/// The timed acquire loop shared by every mode.
///
/// A `timeout` of zero never enters the contested inner loop, so a failed
/// call returns after at most `P::YIELDS` processor-yield hints and never
/// sleeps: zero is meant as "poll once, opportunistically", not as a tiny
/// real deadline, and the cost of checking the clock at all isn't worth
/// paying for a caller that already said not to wait.
fn acquire_timed<P: BackoffPolicy>(
    mut try_once: impl FnMut() -> bool,
    timeout: Duration,
    rounds: Option<&mut u32>,
) -> bool {
    let mut rounds = rounds;
    let mut r = 0u32;

    // Opportunistic phase: identical to the indefinite loop's yield-only
    // prefix, for as long as r <= P::YIELDS.
    loop {
        if try_once() {
            if let Some(out) = rounds {
                *out = r;
            }
            return true;
        }
        r = next_round(r);
        if r <= P::YIELDS {
            core::hint::spin_loop();
        } else {
            break;
        }
    }

    if timeout.is_zero() {
        if let Some(out) = rounds {
            *out = r;
        }
        return false;
    }

    let deadline = Instant::now() + timeout;
    thread::yield_now();

    loop {
        if try_once() {
            if let Some(out) = rounds {
                *out = r;
            }
            return true;
        }
        if Instant::now() >= deadline {
            if let Some(out) = rounds {
                *out = r;
            }
            return false;
        }
        r = next_round(r);
        spin_round::<P>(r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loom::atomic::AtomicI32;

    type Lock = RawRwSpinLock<AtomicI32>;

    #[test]
    fn try_exclusive_then_try_shared_fails() {
        let lock = Lock::new();
        assert!(lock.try_exclusive());
        assert!(!lock.try_shared());
        lock.release_exclusive();
        assert!(lock.try_shared());
    }

    #[test]
    fn try_exclusive_fails_while_held() {
        let lock = Lock::new();
        assert!(lock.try_exclusive());
        assert!(!lock.try_exclusive());
        lock.release_exclusive();
        assert!(lock.try_exclusive());
    }

    #[test]
    fn shared_reference_counting() {
        let lock = Lock::new();
        assert!(lock.try_shared());
        assert!(lock.try_shared());
        assert!(!lock.try_exclusive());
        lock.release_shared();
        assert!(!lock.try_exclusive());
        lock.release_shared();
        assert!(lock.try_exclusive());
    }

    #[test]
    fn upgrade_requires_exactly_one_reader() {
        let lock = Lock::new();
        assert!(lock.try_shared());
        assert!(lock.try_shared());
        assert!(!lock.try_upgrade(), "two readers: upgrade must fail");
        lock.release_shared();
        assert!(lock.try_upgrade(), "one reader left: upgrade must succeed");
        lock.downgrade_to_shared();
        lock.release_shared();
    }

    #[test]
    fn downgrade_round_trip_is_net_neutral() {
        let lock = Lock::new();
        lock.acquire_exclusive(None);
        lock.downgrade_to_shared();
        assert!(lock.is_locked());
        assert!(!lock.is_locked_exclusively());
        lock.release_shared();
        assert!(!lock.is_locked());
    }

    #[test]
    fn force_unlock_recovers_from_hung_holder() {
        let lock = Lock::new();
        assert!(lock.try_exclusive());
        // Simulate a holder that crashed without releasing.
        lock.force_unlock();
        assert!(lock.try_exclusive());
    }

    #[test]
    fn timed_acquire_zero_timeout_fails_fast_when_contended() {
        let lock = Lock::new();
        assert!(lock.try_exclusive());
        let mut rounds = 0u32;
        let got = lock.acquire_exclusive_timeout(Duration::ZERO, Some(&mut rounds));
        assert!(!got);
        assert!(rounds > ExclusivePolicy::YIELDS);
        lock.release_exclusive();
    }

    #[test]
    fn rounds_written_on_success_and_failure() {
        let lock = Lock::new();
        let mut rounds = 123u32;
        assert!(lock.acquire_exclusive_timeout(Duration::from_millis(10), Some(&mut rounds)));
        assert_eq!(rounds, 0);
        lock.release_exclusive();

        assert!(lock.try_exclusive());
        let mut rounds = 0u32;
        let got = lock.acquire_exclusive_timeout(Duration::from_millis(5), Some(&mut rounds));
        assert!(!got);
        assert!(rounds > 0);
    }

    // Model-checked under `cfg(loom)` (see `src/loom.rs`); runs as a plain
    // threaded test otherwise. Same shape as
    // `libs/spin/src/mutex.rs::basic_multi_threaded`: a writer hands off to
    // a reader through the lock itself, with no other synchronization, so
    // loom can explore every interleaving of the handoff.
    #[test]
    fn loom_model_exclusive_handoff_to_shared() {
        use crate::loom::{self, Arc, thread};

        loom::model(|| {
            let lock = Arc::new(Lock::new());
            let writer = {
                let lock = Arc::clone(&lock);
                thread::spawn(move || {
                    lock.acquire_exclusive(None);
                    lock.release_exclusive();
                })
            };
            writer.join().unwrap();
            assert!(lock.try_shared());
            lock.release_shared();
        });
    }
}
