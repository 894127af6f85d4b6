// Copyright (c) 2026 rwspin contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The atomic state cell.
//!
//! The lock's entire persistent state is one signed integer of width 16, 32
//! or 64 bits. [`AtomicState`] abstracts the three widths behind a sealed
//! trait so [`crate::raw::RawRwSpinLock`] can be written once and
//! monomorphized per width, rather than dispatched dynamically: a lock this
//! small should never pay for a vtable call on its hot path.

use crate::loom::atomic::Ordering;

mod sealed {
    pub trait Sealed {}
    impl Sealed for crate::loom::atomic::AtomicI16 {}
    impl Sealed for crate::loom::atomic::AtomicI32 {}
    impl Sealed for crate::loom::atomic::AtomicI64 {}
}

/// An atomic signed integer cell wide enough to hold the lock's state.
///
/// Implemented for `AtomicI16`, `AtomicI32` and `AtomicI64` only. The trait
/// is sealed: callers select a width via the [`crate::RawRwSpinLock16`] /
/// [`crate::RawRwSpinLock32`] / [`crate::RawRwSpinLock64`] aliases, not by
/// implementing this trait themselves.
pub trait AtomicState: sealed::Sealed + Send + Sync {
    /// The plain integer type backing this width.
    type Int: Copy + Eq + PartialOrd + core::fmt::Debug + Send;

    /// `0`, the unowned state.
    const UNOWNED: Self::Int;
    /// `-1`, the exclusive state.
    const EXCLUSIVE: Self::Int;
    /// `1`, a single shared holder.
    const SHARED_ONE: Self::Int;
    /// Upper bound on the number of simultaneous shared holders this width
    /// can represent before [`crate::raw::RawRwSpinLock`] panics rather than
    /// silently wrapping the counter into the exclusive sentinel.
    const MAX_SHARED: Self::Int;

    /// Constructs a cell holding `value`.
    fn new(value: Self::Int) -> Self;
    /// `value + 1`, used to compute the desired state when adding a shared
    /// holder.
    fn succ(value: Self::Int) -> Self::Int;
    /// Reads the current value.
    fn load(&self, order: Ordering) -> Self::Int;
    /// Stores `new` iff the current value equals `current`, unconditionally
    /// returning the prior value either way so the caller can tell success
    /// from failure without a second load.
    fn compare_exchange(
        &self,
        current: Self::Int,
        new: Self::Int,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Int, Self::Int>;
    /// Unconditionally swaps in `value`, returning the previous value.
    fn exchange(&self, value: Self::Int, order: Ordering) -> Self::Int;
    /// Subtracts one, returning the previous value.
    fn decrement(&self, order: Ordering) -> Self::Int;
}

macro_rules! impl_atomic_state {
    ($atomic:ty, $int:ty) => {
        impl AtomicState for $atomic {
            type Int = $int;

            const UNOWNED: $int = 0;
            const EXCLUSIVE: $int = -1;
            const SHARED_ONE: $int = 1;
            const MAX_SHARED: $int = <$int>::MAX / 2;

            #[inline(always)]
            fn new(value: $int) -> Self {
                Self::new(value)
            }

            #[inline(always)]
            fn succ(value: $int) -> $int {
                value + 1
            }

            #[inline(always)]
            fn load(&self, order: Ordering) -> $int {
                Self::load(self, order)
            }

            #[inline(always)]
            fn compare_exchange(
                &self,
                current: $int,
                new: $int,
                success: Ordering,
                failure: Ordering,
            ) -> Result<$int, $int> {
                Self::compare_exchange(self, current, new, success, failure)
            }

            #[inline(always)]
            fn exchange(&self, value: $int, order: Ordering) -> $int {
                Self::swap(self, value, order)
            }

            #[inline(always)]
            fn decrement(&self, order: Ordering) -> $int {
                Self::fetch_sub(self, 1, order)
            }
        }
    };
}

impl_atomic_state!(crate::loom::atomic::AtomicI16, i16);
impl_atomic_state!(crate::loom::atomic::AtomicI32, i32);
impl_atomic_state!(crate::loom::atomic::AtomicI64, i64);
