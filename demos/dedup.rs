//! Concurrent deduplication of an id stream.
//!
//! Several workers pull ids from a shared stream and claim each one in the
//! bitset; only ids that were not already present are counted as new.
//!
//! ```text
//! cargo run --release --example dedup
//! ```

use lockfree_bitset::{AtomicBitset, BitsetConfig, Status};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

const IDS: usize = 200_000;
const WORKERS: usize = 4;
const ID_SPACE: usize = 1 << 24;

fn id_at(i: usize) -> usize {
    // Plenty of repeats: the stream only draws from a quarter of its length.
    (i % (IDS / 4)).wrapping_mul(2_654_435_761) % ID_SPACE
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = BitsetConfig::for_positions(ID_SPACE, 14);
    let seen: AtomicBitset<u64> = AtomicBitset::with_config(config)?;
    let fresh = AtomicUsize::new(0);

    thread::scope(|s| {
        for w in 0..WORKERS {
            let (seen, fresh) = (&seen, &fresh);
            s.spawn(move || {
                for i in (w..IDS).step_by(WORKERS) {
                    let id = id_at(i);
                    // `test` then `set` is not a single claim, so two workers
                    // may both count the same id; good enough for a sample.
                    if seen.test(id) == Status::No && seen.set(id).is_success() {
                        fresh.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    println!("stream length     : {IDS}");
    println!("distinct (approx) : {}", fresh.load(Ordering::Relaxed));
    println!(
        "shards installed  : {} / {}",
        seen.installed_shards(),
        seen.capacity()
    );
    println!("{seen:?}");
    Ok(())
}
