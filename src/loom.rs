// Copyright (c) 2026 rwspin contributors
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Indirection layer so the lock's test suite can run twice: once against
//! real `std` atomics/threads, and once against `loom`'s shadow model for
//! exhaustive interleaving checks.

cfg_if::cfg_if! {
    if #[cfg(loom)] {
        pub(crate) use loom::sync::atomic;
        pub(crate) use loom::sync::Arc;
        pub(crate) use loom::thread;

        #[inline(always)]
        pub(crate) fn model<F>(f: F)
        where
            F: Fn() + Sync + Send + 'static,
        {
            loom::model(f);
        }
    } else {
        pub(crate) use std::sync::atomic;
        pub(crate) use std::thread;

        #[cfg(test)]
        pub(crate) use std::sync::Arc;

        #[cfg(test)]
        #[inline(always)]
        pub(crate) fn model<F>(f: F)
        where
            F: Fn() + Sync + Send + 'static,
        {
            f();
        }
    }
}
