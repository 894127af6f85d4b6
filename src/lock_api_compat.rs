// Copyright (c) 2026 rwspin contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Optional `lock_api` interop, mirroring `libs/spin::Mutex`'s
//! `#[cfg(feature = "lock_api")] unsafe impl
//! lock_api::RawMutex`. Gated behind the `lock_api` feature and off by
//! default: `rwspin`'s own guard surface (with its `rounds` out-parameters,
//! `temporarily_unlock`, and `force_unlock`) is richer than what
//! `lock_api`'s traits can express, so this shim exists purely so
//! `RawRwSpinLock32` can also be dropped into any `lock_api::RwLock<R, T>`
//! generic container.
//!
//! `rwspin`'s counter has no separate "upgradable" bit the way
//! `parking_lot`-style implementations do (see `libs/spin/src/rw_lock.rs`'s
//! `UPGRADED` bit) — holding a single shared reference *is* "upgradable"
//! here. `downgrade_upgradable` is therefore a no-op: the counter value
//! doesn't change, only what the caller promises to do with it does.

use crate::backoff::UpgradePolicy;
use crate::raw::RawRwSpinLock;

type Compat = RawRwSpinLock<crate::loom::atomic::AtomicI32>;

#[expect(clippy::undocumented_unsafe_blocks, reason = "contract documented on each method")]
unsafe impl lock_api::RawRwLock for Compat {
    const INIT: Self = Self::new();
    type GuardMarker = lock_api::GuardSend;

    fn lock_shared(&self) {
        self.acquire_shared(None);
    }

    fn try_lock_shared(&self) -> bool {
        self.try_shared()
    }

    unsafe fn unlock_shared(&self) {
        self.release_shared();
    }

    fn lock_exclusive(&self) {
        self.acquire_exclusive(None);
    }

    fn try_lock_exclusive(&self) -> bool {
        self.try_exclusive()
    }

    unsafe fn unlock_exclusive(&self) {
        self.release_exclusive();
    }

    fn is_locked(&self) -> bool {
        self.is_locked()
    }

    fn is_locked_exclusive(&self) -> bool {
        self.is_locked_exclusively()
    }
}

#[expect(clippy::undocumented_unsafe_blocks, reason = "contract documented on each method")]
unsafe impl lock_api::RawRwLockUpgrade for Compat {
    fn lock_upgradable(&self) {
        self.acquire_shared(None);
    }

    fn try_lock_upgradable(&self) -> bool {
        self.try_shared()
    }

    unsafe fn unlock_upgradable(&self) {
        self.release_shared();
    }

    unsafe fn upgrade(&self) {
        // No indefinite `upgrade` exists on `rwspin`'s own API by design: a
        // stuck upgrade usually means another reader is upgrading too, and
        // a caller should see that as a timeout rather than spin forever.
        // `lock_api::RawRwLockUpgrade` requires a
        // blocking variant regardless, so this shim provides one using the
        // same backoff schedule `upgrade_timeout` uses internally. Method
        // resolution prefers the inherent `RawRwSpinLock::try_upgrade` over
        // this trait's own method of the same name, so this doesn't recurse.
        let mut r = 0u32;
        while !self.try_upgrade() {
            r = crate::backoff::next_round(r);
            crate::backoff::spin_round::<UpgradePolicy>(r);
        }
    }

    unsafe fn try_upgrade(&self) -> bool {
        self.try_upgrade()
    }
}

#[expect(clippy::undocumented_unsafe_blocks, reason = "contract documented on each method")]
unsafe impl lock_api::RawRwLockDowngrade for Compat {
    unsafe fn downgrade(&self) {
        self.downgrade_to_shared();
    }
}

#[expect(clippy::undocumented_unsafe_blocks, reason = "contract documented on each method")]
unsafe impl lock_api::RawRwLockUpgradeDowngrade for Compat {
    unsafe fn downgrade_upgradable(&self) {
        // No-op: see module docs. The counter already reads as a single
        // shared holder either way.
    }

    unsafe fn downgrade_to_upgradable(&self) {
        self.downgrade_to_shared();
    }
}
