//! # `lockfree-bitset` - Sparse Lock-Free Atomic Bitset
//!
//! A fixed-capacity bitset that many threads can set, clear and test
//! concurrently without a mutex. Built for high-throughput membership
//! tracking (deduplication, sampling, presence indices) where a single lock
//! around a bitset becomes the bottleneck.
//!
//! ## Layout
//!
//! Two levels:
//!
//! 1. **Directory**: a fixed array of atomic slot pointers, one per shard.
//! 2. **Shards**: blocks of `2^bitset_width` bits stored as atomic words,
//!    allocated the first time a `set` touches their slot and never replaced.
//!
//! A position `p` lives in shard `p >> bitset_width`; the directory is
//! indexed directly, so there is no hashing and no probing.
//!
//! ## Concurrency Guarantees
//!
//! - **Lock-free**: every operation finishes in O(1) atomic steps, or after at
//!   most `max_tries` attempts on the defensive collision path.
//! - **No lost updates**: bits are flipped with atomic `fetch_or` /
//!   `fetch_and`, so racing writers on the same word never clobber each other.
//! - **Safe publication**: a new shard is installed with an `AcqRel` CAS and
//!   every slot read is `Acquire`, so no thread ever sees a half-built shard.
//! - **No leaks**: the loser of a publish race frees its speculative shard.
//! - **Reads never allocate**: `test` and `reset` on an untouched shard answer
//!   from the empty slot.
//!
//! `reset_all` is *not* atomic as a whole; see its docs.
//!
//! ## Example
//!
//! ```rust
//! use lockfree_bitset::{AtomicBitset, BitsetConfig, Status};
//! use std::thread;
//!
//! let seen: AtomicBitset = AtomicBitset::with_config(BitsetConfig::for_positions(1 << 20, 12)).unwrap();
//!
//! thread::scope(|s| {
//!     for t in 0..4 {
//!         let seen = &seen;
//!         s.spawn(move || {
//!             for i in (t..1000).step_by(4) {
//!                 assert_eq!(seen.set(i * 97), Status::Success);
//!             }
//!         });
//!     }
//! });
//!
//! assert_eq!(seen.test(97), Status::Yes);
//! assert_eq!(seen.test(98), Status::No);
//! ```
//!
//! ## Features
//!
//! - `tracing`: emit `tracing` events for publish races, out-of-domain
//!   positions and retry exhaustion.
//! - `parallel`: run `reset_all` across the directory with `rayon`.
//! - `alloc-*`: pick the global allocator used by the benchmarks.

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod sync;
mod trace;

pub mod concurrency;
pub mod config;
pub mod status;

pub use concurrency::atomic::{AtomicBitset, BitWord, Coordinates, PositionCodec};
pub use config::{BitsetConfig, ConfigError};
pub use status::Status;

// Compile-time assertions for layout and thread-safety claims.
const _: () = {
    use core::mem;

    // The status vocabulary is a single byte.
    assert!(mem::size_of::<Status>() == 1);

    // The bitset header is independent of capacity; shards live behind pointers.
    assert!(mem::size_of::<AtomicBitset<u64>>() == mem::size_of::<AtomicBitset<u8>>());
};

const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AtomicBitset<u8>>();
    assert_send_sync::<AtomicBitset<u16>>();
    assert_send_sync::<AtomicBitset<u32>>();
    assert_send_sync::<AtomicBitset<u64>>();
    assert_send_sync::<AtomicBitset<usize>>();
};
