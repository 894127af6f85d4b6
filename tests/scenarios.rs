//! End-to-end scenarios exercising `RwSpinLock` across real OS threads,
//! rather than the single-threaded contract tests in each module's own
//! `#[cfg(test)]` block.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use rwspin::RwSpinLock;

#[test]
fn exclusive_alternation_is_lost_update_free() {
    const ITERS_PER_THREAD: usize = 1_000_000;
    let lock = Arc::new(RwSpinLock::new(0u64));

    let threads: Vec<_> = (0..2)
        .map(|_| {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                for _ in 0..ITERS_PER_THREAD {
                    *lock.exclusively(None) += 1;
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(*lock.share(None), (2 * ITERS_PER_THREAD) as u64);
}

#[test]
fn reader_scaling_never_observes_writer_progress_mid_read() {
    const READERS: usize = 16;
    const ITERS_PER_READER: usize = 100_000;
    // Two halves of one logical value; a reader that ever observes them
    // unequal caught a writer acting without exclusive access.
    let lock = Arc::new(RwSpinLock::new((0u64, 0u64)));

    let writer = {
        let lock = Arc::clone(&lock);
        thread::spawn(move || {
            for _ in 0..(ITERS_PER_READER / 10) {
                let mut g = lock.exclusively(None);
                g.0 = g.0.wrapping_add(1);
                g.1 = g.0;
            }
        })
    };

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                for _ in 0..ITERS_PER_READER {
                    let g = lock.share(None);
                    assert_eq!(g.0, g.1);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
}

#[test]
fn upgrade_contention_only_sole_reader_wins() {
    let lock = RwSpinLock::new(0i32);

    // Two shared holders at once: neither can upgrade, and exclusive
    // access is out of the question either.
    let a = lock.share(None);
    let b = lock.share(None);

    let a = match a.try_upgrade() {
        Ok(_) => panic!("must not succeed while a second shared holder exists"),
        Err(a) => a,
    };
    assert!(lock.try_exclusive().is_none());

    drop(b);

    // Exactly one shared reference remains; the upgrade must now succeed.
    let mut upgraded = a
        .try_upgrade()
        .unwrap_or_else(|_| panic!("sole reader must be able to upgrade"));
    *upgraded = 7;
    drop(upgraded);
    assert_eq!(*lock.share(None), 7);
}

#[test]
fn timed_exclusive_acquire_times_out_under_sustained_hold() {
    let lock = Arc::new(RwSpinLock::new(()));
    let holder_ready = Arc::new(AtomicUsize::new(0));

    let holder = {
        let lock = Arc::clone(&lock);
        let holder_ready = Arc::clone(&holder_ready);
        thread::spawn(move || {
            let _guard = lock.exclusively(None);
            holder_ready.store(1, Ordering::Release);
            thread::sleep(Duration::from_millis(200));
        })
    };

    while holder_ready.load(Ordering::Acquire) == 0 {
        thread::yield_now();
    }

    let start = Instant::now();
    let got = lock.try_exclusively_for(Duration::from_millis(50), None);
    let elapsed = start.elapsed();

    assert!(got.is_none(), "lock was held for 200ms, a 50ms wait must fail");
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_millis(200));

    holder.join().unwrap();
    assert!(lock.try_exclusive().is_some());
}

#[test]
fn downgrade_never_exposes_an_unowned_window() {
    const ROUNDS: usize = 20_000;
    let lock = Arc::new(RwSpinLock::new(0u64));
    let stop = Arc::new(AtomicUsize::new(0));
    let saw_gap = Arc::new(AtomicUsize::new(0));

    let watcher = {
        let lock = Arc::clone(&lock);
        let stop = Arc::clone(&stop);
        let saw_gap = Arc::clone(&saw_gap);
        thread::spawn(move || {
            while stop.load(Ordering::Acquire) == 0 {
                // `is_locked` is racy/advisory by design; this is a
                // best-effort statistical check, not a proof.
                if !lock.is_locked() {
                    saw_gap.fetch_add(1, Ordering::Relaxed);
                }
            }
        })
    };

    for i in 0..ROUNDS {
        let mut guard = lock.exclusively(None);
        *guard = i as u64;
        let _reader = guard.downgrade();
    }

    stop.store(1, Ordering::Release);
    watcher.join().unwrap();

    assert_eq!(
        saw_gap.load(Ordering::Relaxed),
        0,
        "downgrade must never let the lock read as unowned"
    );
}

#[test]
fn force_unlock_recovers_from_a_holder_that_never_releases() {
    let lock = RwSpinLock::new(0i32);

    {
        let guard = lock.exclusively(None);
        // Simulate a crashed holder: the guard's `Drop` never runs.
        core::mem::forget(guard);
    }

    assert!(lock.try_exclusive().is_none());
    // Safety: the forgotten guard above is the lock's only holder and it
    // will never release on its own.
    unsafe { lock.force_unlock() };
    assert!(lock.try_exclusive().is_some());
}
