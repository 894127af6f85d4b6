// Copyright (c) 2026 rwspin contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! A slim, unfair reader/writer spin lock for very short critical sections.
//!
//! The entire lock state lives in a single signed integer cell: `0` unowned,
//! `-1` held exclusively, `k >= 1` held by `k` shared readers. Acquisition is
//! a busy-spin / processor-yield / cooperative-thread-yield / short-sleep
//! backoff ladder tuned independently for exclusive, shared and upgrade
//! attempts — there is no queueing, no FIFO ordering and no writer priority.
//! This is deliberate: the lock is meant for protecting a handful of machine
//! instructions in many independent places, not for arbitrating one heavily
//! contended resource.
//!
//! Because the state cell is just one small integer, it may be embedded in
//! any structure — including a page mapped `MAP_SHARED` across process
//! boundaries — without any allocation, kernel handle or thread-local state
//! of its own.
//!
//! # What this lock is not
//!
//! - **Not fair.** A continuous stream of readers can starve a writer, and
//!   tight writer contention can starve readers.
//! - **Not reentrant.** A thread re-acquiring exclusively deadlocks itself.
//! - **Not forgiving of misuse.** Releasing a mode you don't hold, or
//!   upgrading without holding exactly one shared reference, is undefined
//!   behavior at the contract level — not a checked error.
//!
//! # Choosing a width
//!
//! The state cell's width is a compile-time, monomorphized choice between
//! 16, 32 and 64 bits — see [`RwSpinLock16`], [`RwSpinLock32`] (the
//! unparameterized [`RwSpinLock`] alias) and [`RwSpinLock64`]. Pick the
//! narrowest width that comfortably bounds your worst-case reader count;
//! narrower cells pack tighter when a lock sits inline in a hot struct or in
//! a shared-memory header.
//!
//! ```
//! use rwspin::RwSpinLock;
//!
//! let counter = RwSpinLock::new(0_u64);
//! {
//!     let mut guard = counter.exclusively(None);
//!     *guard += 1;
//! }
//! assert_eq!(*counter.share(None), 1);
//! ```

#![warn(missing_docs)]

mod backoff;
mod guard;
mod loom;
mod raw;
mod width;

#[cfg(feature = "lock_api")]
mod lock_api_compat;

// The public, data-carrying lock. Lives in its own module mostly so
// `guard.rs` can refer back to it without a cycle through `lib.rs`.
mod lock;

pub use backoff::{BackoffPolicy, ExclusivePolicy, SharedPolicy, UpgradePolicy};
pub use guard::{ExclusiveGuard, ExclusiveUnlocked, SharedGuard, SharedUnlocked, UpgradedGuard};
pub use lock::RwSpinLock;
pub use raw::RawRwSpinLock;
pub use width::AtomicState;

use loom::atomic::{AtomicI16, AtomicI32, AtomicI64};

/// A bare lock primitive with a 16-bit state cell. See [`RawRwSpinLock`].
pub type RawRwSpinLock16 = RawRwSpinLock<AtomicI16>;
/// A bare lock primitive with a 32-bit state cell. See [`RawRwSpinLock`].
pub type RawRwSpinLock32 = RawRwSpinLock<AtomicI32>;
/// A bare lock primitive with a 64-bit state cell. See [`RawRwSpinLock`].
pub type RawRwSpinLock64 = RawRwSpinLock<AtomicI64>;

/// [`RwSpinLock`] with a 16-bit state cell: up to `i16::MAX / 2` concurrent
/// readers before the overflow guard panics.
pub type RwSpinLock16<T> = RwSpinLock<T, AtomicI16>;
/// [`RwSpinLock`] with a 32-bit state cell: up to `i32::MAX / 2` concurrent
/// readers. This is the default width used by the unparameterized
/// [`RwSpinLock`] alias.
pub type RwSpinLock32<T> = RwSpinLock<T, AtomicI32>;
/// [`RwSpinLock`] with a 64-bit state cell: up to `i64::MAX / 2` concurrent
/// readers.
pub type RwSpinLock64<T> = RwSpinLock<T, AtomicI64>;
