//! Sparse lock-free atomic bitset.
//!
//! Two levels: a fixed directory of atomic slot pointers, and shards of
//! atomic words that are allocated the first time `set` touches their slot.
//!
//! # Publish protocol
//! A thread that finds its slot empty allocates a shard with the target bit
//! already set and CASes it into the slot. The winner's shard becomes the
//! permanent owner of that slot; a loser ORs its bit into the winner and
//! frees its own speculative shard on the way out.
//!
//! # Ordering
//! - The publish CAS is `AcqRel`, every slot load is `Acquire`, so a shard's
//!   words are initialized before any other thread can reach them.
//! - Word RMWs are `Relaxed`: atomicity alone prevents lost updates and no
//!   other memory is ordered by them.
//!
//! Slots go empty → occupied at most once and installed shards are never
//! replaced, so a shard reference stays valid until the bitset is dropped.

use core::{fmt, marker::PhantomData, ptr};

use crossbeam_utils::Backoff;

use super::codec::{Coordinates, PositionCodec};
use super::shard::{Shard, Speculative};
use super::word::BitWord;
use crate::config::{BitsetConfig, ConfigError};
use crate::status::Status;
use crate::sync::{AtomicPtr, Ordering};
use crate::trace::trace_event;

/// A fixed-capacity, sparse, lock-free bitset.
///
/// Positions range over `0..capacity × 2^bitset_width`. Every operation takes
/// `&self` and completes in a bounded number of atomic steps.
///
/// ```
/// use lockfree_bitset::{AtomicBitset, BitsetConfig, Status};
///
/// let bits: AtomicBitset = AtomicBitset::with_config(BitsetConfig::new(8).with_bitset_width(5))?;
/// assert_eq!(bits.test(40), Status::No);
/// assert_eq!(bits.set(40), Status::Success);
/// assert_eq!(bits.test(40), Status::Yes);
/// assert_eq!(bits.installed_shards(), 1);
/// # Ok::<(), lockfree_bitset::ConfigError>(())
/// ```
pub struct AtomicBitset<W: BitWord = u32> {
    directory: Box<[AtomicPtr<Shard<W>>]>,
    codec: PositionCodec,
    config: BitsetConfig,
    len_bits: usize,
    _owns: PhantomData<Box<Shard<W>>>,
}

impl<W: BitWord> AtomicBitset<W> {
    /// Creates a bitset with `capacity` shards and default width and retry bound.
    ///
    /// # Panics
    /// Panics if the resulting config is invalid for `W`
    /// (see [`BitsetConfig::validate`]).
    pub fn new(capacity: usize) -> Self {
        match Self::with_config(BitsetConfig::new(capacity)) {
            Ok(bits) => bits,
            Err(e) => panic!("invalid bitset config: {e}"),
        }
    }

    /// Creates a bitset with the given shape. No shard is allocated up front.
    ///
    /// # Errors
    /// Returns the [`ConfigError`] reported by [`BitsetConfig::validate`].
    pub fn with_config(config: BitsetConfig) -> Result<Self, ConfigError> {
        config.validate::<W>()?;
        let len_bits = config.len_bits().ok_or(ConfigError::DomainOverflow {
            capacity: config.capacity,
            bitset_width: config.bitset_width,
        })?;
        let directory = (0..config.capacity)
            .map(|_| AtomicPtr::new(ptr::null_mut()))
            .collect();
        Ok(Self {
            directory,
            codec: PositionCodec::new(config.bitset_width, W::BITS),
            config,
            len_bits,
            _owns: PhantomData,
        })
    }

    /// The shape this bitset was built with.
    #[inline]
    pub fn config(&self) -> BitsetConfig {
        self.config
    }

    /// Number of directory slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// log2 of the number of bits per shard.
    #[inline]
    pub fn bitset_width(&self) -> u32 {
        self.config.bitset_width
    }

    /// Bits covered by one shard.
    #[inline]
    pub fn bits_per_shard(&self) -> usize {
        self.codec.bits_per_shard()
    }

    /// Words allocated per shard.
    #[inline]
    pub fn words_per_shard(&self) -> usize {
        self.codec.words_per_shard()
    }

    /// Retry bound for the collision path.
    #[inline]
    pub fn max_tries(&self) -> usize {
        self.config.max_tries
    }

    /// Size of the position domain: valid positions are `0..len_bits()`.
    #[inline]
    pub fn len_bits(&self) -> usize {
        self.len_bits
    }

    /// Number of shards currently installed in the directory.
    pub fn installed_shards(&self) -> usize {
        self.directory
            .iter()
            .filter(|slot| !slot.load(Ordering::Acquire).is_null())
            .count()
    }

    /// Returns whether directory slot `shard` has been installed.
    ///
    /// Out-of-range slots report `false`.
    pub fn is_installed(&self, shard: usize) -> bool {
        self.directory
            .get(shard)
            .is_some_and(|slot| !slot.load(Ordering::Acquire).is_null())
    }

    /// Sets the bit at `pos`.
    ///
    /// Installs the covering shard on first touch. Setting an already-set bit
    /// is a no-op that still reports [`Status::Success`]. Returns
    /// [`Status::Failed`] if `pos` is outside the domain or the retry bound is
    /// exhausted.
    pub fn set(&self, pos: usize) -> Status {
        let Some(at) = self.locate(pos) else {
            return Status::Failed;
        };
        let mask = W::mask(at.offset);
        let slot = &self.directory[at.shard];
        let backoff = Backoff::new();

        for attempt in 0..self.config.max_tries {
            let current = slot.load(Ordering::Acquire);
            if current.is_null() {
                let fresh = Speculative::new(Shard::with_bit(
                    at.shard,
                    self.codec.words_per_shard(),
                    at.word,
                    mask,
                ));
                match slot.compare_exchange(
                    ptr::null_mut(),
                    fresh.as_ptr(),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => {
                        fresh.publish();
                        trace_event!(trace, shard = at.shard, "published shard");
                        return Status::Success;
                    }
                    Err(winner) => {
                        // SAFETY: non-null slot pointers stay valid until drop.
                        let winner = unsafe { &*winner };
                        if self.owns(winner, at, attempt) {
                            winner.set(at.word, mask);
                            trace_event!(debug, shard = at.shard, "lost publish race, reclaiming shard");
                            return Status::Success;
                        }
                        // `fresh` is freed here; the mismatch was logged by `owns`.
                    }
                }
            } else {
                // SAFETY: non-null slot pointers stay valid until drop.
                let shard = unsafe { &*current };
                if self.owns(shard, at, attempt) {
                    shard.set(at.word, mask);
                    return Status::Success;
                }
            }
            backoff.spin();
        }

        self.exhausted(pos);
        Status::Failed
    }

    /// Clears the bit at `pos`.
    ///
    /// A position whose shard was never installed is already clear: this
    /// returns [`Status::Success`] without allocating. Returns
    /// [`Status::NotFound`] if `pos` is outside the domain or the retry bound
    /// is exhausted.
    pub fn reset(&self, pos: usize) -> Status {
        let Some(at) = self.locate(pos) else {
            return Status::NotFound;
        };
        let slot = &self.directory[at.shard];
        let backoff = Backoff::new();

        for attempt in 0..self.config.max_tries {
            let current = slot.load(Ordering::Acquire);
            if current.is_null() {
                return Status::Success;
            }
            // SAFETY: non-null slot pointers stay valid until drop.
            let shard = unsafe { &*current };
            if self.owns(shard, at, attempt) {
                shard.clear(at.word, W::mask(at.offset));
                return Status::Success;
            }
            backoff.spin();
        }

        self.exhausted(pos);
        Status::NotFound
    }

    /// Tests the bit at `pos`: [`Status::Yes`] or [`Status::No`].
    ///
    /// Never allocates. Returns [`Status::NotFound`] if `pos` is outside the
    /// domain or the retry bound is exhausted.
    pub fn test(&self, pos: usize) -> Status {
        let Some(at) = self.locate(pos) else {
            return Status::NotFound;
        };
        let slot = &self.directory[at.shard];
        let backoff = Backoff::new();

        for attempt in 0..self.config.max_tries {
            let current = slot.load(Ordering::Acquire);
            if current.is_null() {
                return Status::No;
            }
            // SAFETY: non-null slot pointers stay valid until drop.
            let shard = unsafe { &*current };
            if self.owns(shard, at, attempt) {
                return if shard.test(at.word, W::mask(at.offset)) {
                    Status::Yes
                } else {
                    Status::No
                };
            }
            backoff.spin();
        }

        self.exhausted(pos);
        Status::NotFound
    }

    /// Clears every bit of every installed shard in place.
    ///
    /// Slots that were never installed stay empty. This is not atomic as a
    /// whole: a concurrent `set`/`test` may observe some words already
    /// cleared and others not. Quiesce writers first if a consistent
    /// snapshot matters.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn reset_all(&self) -> Status {
        #[cfg(feature = "parallel")]
        let cleared = {
            use rayon::prelude::*;
            self.directory.par_iter().filter(|slot| Self::clear_slot(slot)).count()
        };
        #[cfg(not(feature = "parallel"))]
        let cleared = self.directory.iter().filter(|slot| Self::clear_slot(slot)).count();

        trace_event!(debug, cleared, "bulk reset finished");
        Status::Success
    }

    /// Zeroes the shard in `slot`, if any. Returns whether one was installed.
    fn clear_slot(slot: &AtomicPtr<Shard<W>>) -> bool {
        let current = slot.load(Ordering::Acquire);
        if current.is_null() {
            return false;
        }
        // SAFETY: non-null slot pointers stay valid until drop.
        unsafe { &*current }.clear_all();
        true
    }

    #[inline(always)]
    fn locate(&self, pos: usize) -> Option<Coordinates> {
        if pos >= self.len_bits {
            trace_event!(warn, pos, len_bits = self.len_bits, "position outside bitset domain");
            return None;
        }
        Some(self.codec.decode(pos))
    }

    /// Checks that `shard` was built for the slot `at` points into.
    ///
    /// The directory is indexed directly by position, so a mismatch means the
    /// layout invariant is broken; release builds fall back to a bounded retry.
    #[inline(always)]
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn owns(&self, shard: &Shard<W>, at: Coordinates, attempt: usize) -> bool {
        if shard.tag() == at.shard {
            return true;
        }
        debug_assert_eq!(shard.tag(), at.shard, "slot holds a shard built for another slot");
        trace_event!(
            warn,
            pos = self.codec.encode(at),
            shard = at.shard,
            tag = shard.tag(),
            attempt,
            "shard tag mismatch, retrying"
        );
        false
    }

    #[cold]
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn exhausted(&self, pos: usize) {
        trace_event!(error, pos, max_tries = self.config.max_tries, "retry bound exhausted");
    }
}

impl<W: BitWord> Drop for AtomicBitset<W> {
    fn drop(&mut self) {
        for slot in self.directory.iter() {
            let shard = slot.swap(ptr::null_mut(), Ordering::Acquire);
            if !shard.is_null() {
                // SAFETY: published shards are owned by their slot; `&mut self`
                // guarantees no other reference remains.
                drop(unsafe { Box::from_raw(shard) });
            }
        }
    }
}

impl<W: BitWord> fmt::Debug for AtomicBitset<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicBitset")
            .field("capacity", &self.config.capacity)
            .field("bitset_width", &self.config.bitset_width)
            .field("word_bits", &W::BITS)
            .field("max_tries", &self.config.max_tries)
            .field("installed_shards", &self.installed_shards())
            .finish()
    }
}
