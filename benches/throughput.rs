use std::sync::Arc;
use std::thread;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rwspin::RwSpinLock;

fn uncontended_exclusive(c: &mut Criterion) {
    let lock = RwSpinLock::new(0u64);
    c.bench_function("uncontended_exclusive", |b| {
        b.iter(|| {
            *lock.exclusively(None) += 1;
            black_box(());
        })
    });
}

fn uncontended_shared(c: &mut Criterion) {
    let lock = RwSpinLock::new(42u64);
    c.bench_function("uncontended_shared", |b| {
        b.iter(|| black_box(*lock.share(None)))
    });
}

fn reader_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("reader_scaling");
    for &readers in &[1usize, 2, 4, 8, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(readers), &readers, |b, &readers| {
            let lock = Arc::new(RwSpinLock::new(0u64));
            b.iter(|| {
                thread::scope(|s| {
                    for _ in 0..readers {
                        let lock = Arc::clone(&lock);
                        s.spawn(move || {
                            for _ in 0..1_000 {
                                black_box(*lock.share(None));
                            }
                        });
                    }
                });
            });
        });
    }
    group.finish();
}

fn exclusive_vs_shared_mix(c: &mut Criterion) {
    c.bench_function("one_writer_three_readers", |b| {
        let lock = Arc::new(RwSpinLock::new(0u64));
        b.iter(|| {
            thread::scope(|s| {
                let writer = Arc::clone(&lock);
                s.spawn(move || {
                    for _ in 0..200 {
                        *writer.exclusively(None) += 1;
                    }
                });
                for _ in 0..3 {
                    let lock = Arc::clone(&lock);
                    s.spawn(move || {
                        for _ in 0..200 {
                            black_box(*lock.share(None));
                        }
                    });
                }
            });
        });
    });
}

criterion_group!(
    benches,
    uncontended_exclusive,
    uncontended_shared,
    reader_scaling,
    exclusive_vs_shared_mix
);
criterion_main!(benches);
