use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lockfree_bitset::{AtomicBitset, BitsetConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread;

#[cfg(feature = "alloc-mimalloc")]
use mimalloc::MiMalloc;

#[cfg(feature = "alloc-mimalloc")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[cfg(feature = "alloc-snmalloc")]
use snmalloc_rs::SnMalloc;

#[cfg(feature = "alloc-snmalloc")]
#[global_allocator]
static GLOBAL: SnMalloc = SnMalloc;

#[cfg(feature = "alloc-jemalloc")]
use jemallocator::Jemalloc;

#[cfg(feature = "alloc-jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

const THREADS: usize = 4;
const OPS_PER_THREAD: usize = 10_000;
const DOMAIN: usize = 1 << 22;

/// Scatters `i` over the domain so consecutive ops hit different shards.
#[inline(always)]
fn scatter(i: usize) -> usize {
    i.wrapping_mul(0x9E37_79B9) % DOMAIN
}

fn sparse() -> AtomicBitset<u64> {
    AtomicBitset::with_config(BitsetConfig::for_positions(DOMAIN, 12)).unwrap()
}

fn bench_first_touch(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_touch");
    const SHARDS: usize = 256;
    group.throughput(Throughput::Elements(SHARDS as u64));

    // One `set` per shard: dominated by shard allocation + publish CAS.
    group.bench_function("atomic_bitset", |b| {
        b.iter(|| {
            let bits = sparse();
            for shard in 0..SHARDS {
                black_box(bits.set(shard << 12));
            }
            bits
        })
    });

    group.finish();
}

fn bench_single_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_thread");
    group.throughput(Throughput::Elements(OPS_PER_THREAD as u64));

    let bits = sparse();
    group.bench_function("atomic_bitset_set", |b| {
        b.iter(|| {
            for i in 0..OPS_PER_THREAD {
                black_box(bits.set(scatter(i)));
            }
        })
    });
    group.bench_function("atomic_bitset_test", |b| {
        b.iter(|| {
            for i in 0..OPS_PER_THREAD {
                black_box(bits.test(scatter(i)));
            }
        })
    });

    let dense: Vec<AtomicU64> = (0..DOMAIN / 64).map(|_| AtomicU64::new(0)).collect();
    group.bench_function("dense_atomic_set", |b| {
        b.iter(|| {
            for i in 0..OPS_PER_THREAD {
                let pos = scatter(i);
                black_box(dense[pos / 64].fetch_or(1 << (pos % 64), Ordering::Relaxed));
            }
        })
    });

    group.finish();
}

fn bench_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_set");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    group.bench_function("std_mutex_vec", |b| {
        let words = Mutex::new(vec![0u64; DOMAIN / 64]);
        b.iter(|| {
            thread::scope(|s| {
                for t in 0..THREADS {
                    let words = &words;
                    s.spawn(move || {
                        for i in 0..OPS_PER_THREAD {
                            let pos = scatter(i * THREADS + t);
                            let mut g = words.lock().unwrap();
                            g[pos / 64] |= 1 << (pos % 64);
                        }
                    });
                }
            });
        })
    });

    group.bench_function("atomic_bitset", |b| {
        b.iter(|| {
            let bits = sparse();
            thread::scope(|s| {
                for t in 0..THREADS {
                    let bits = &bits;
                    s.spawn(move || {
                        for i in 0..OPS_PER_THREAD {
                            black_box(bits.set(scatter(i * THREADS + t)));
                        }
                    });
                }
            });
            bits
        })
    });

    group.finish();
}

fn bench_reset_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("reset_all");
    let bits = sparse();
    for i in 0..OPS_PER_THREAD {
        let _ = bits.set(scatter(i));
    }
    group.throughput(Throughput::Elements(bits.installed_shards() as u64));
    group.bench_function("atomic_bitset", |b| b.iter(|| black_box(bits.reset_all())));
    group.finish();
}

criterion_group!(
    benches,
    bench_first_touch,
    bench_single_thread,
    bench_contended,
    bench_reset_all
);
criterion_main!(benches);
