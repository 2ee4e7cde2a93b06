//! Lazily allocated shards and the speculative-publish guard.

use core::ptr::NonNull;

use super::word::BitWord;
use crate::sync::Ordering;

/// One block of atomic words covering a contiguous range of positions.
///
/// The tag is the directory index the shard was built for and never changes
/// after construction; only the word contents mutate.
pub(crate) struct Shard<W: BitWord> {
    tag: usize,
    words: Box<[W::Atomic]>,
}

impl<W: BitWord> Shard<W> {
    /// Allocates a zeroed shard with `word` pre-seeded by `mask`.
    pub(crate) fn with_bit(tag: usize, words_len: usize, word: usize, mask: W) -> Box<Self> {
        let words = (0..words_len)
            .map(|i| W::new_atomic(if i == word { mask } else { W::zero() }))
            .collect();
        Box::new(Self { tag, words })
    }

    #[inline(always)]
    pub(crate) fn tag(&self) -> usize {
        self.tag
    }

    #[inline(always)]
    pub(crate) fn set(&self, word: usize, mask: W) {
        W::fetch_or(&self.words[word], mask, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn clear(&self, word: usize, mask: W) {
        W::fetch_and(&self.words[word], !mask, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn test(&self, word: usize, mask: W) -> bool {
        (W::load(&self.words[word], Ordering::Relaxed) & mask) != W::zero()
    }

    /// Zeroes every word in place.
    pub(crate) fn clear_all(&self) {
        for w in self.words.iter() {
            W::store(w, W::zero(), Ordering::Relaxed);
        }
    }
}

/// A shard that has been allocated but not yet published.
///
/// The creating thread owns it until [`publish`](Self::publish) is called
/// after a successful CAS. Dropping the guard on any other path frees the
/// shard, so the loser of a publish race is always reclaimed.
pub(crate) struct Speculative<W: BitWord> {
    ptr: NonNull<Shard<W>>,
}

impl<W: BitWord> Speculative<W> {
    pub(crate) fn new(shard: Box<Shard<W>>) -> Self {
        Self {
            ptr: NonNull::from(Box::leak(shard)),
        }
    }

    /// Raw pointer to hand to the directory CAS.
    #[inline(always)]
    pub(crate) fn as_ptr(&self) -> *mut Shard<W> {
        self.ptr.as_ptr()
    }

    /// Relinquishes ownership to the directory slot the shard was CAS'd into.
    #[inline(always)]
    pub(crate) fn publish(self) {
        core::mem::forget(self);
    }
}

impl<W: BitWord> Drop for Speculative<W> {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from `Box::leak` and was never published, so
        // this guard is its only owner.
        drop(unsafe { Box::from_raw(self.ptr.as_ptr()) });
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn seeded_bit_is_visible() {
        let shard = Shard::<u32>::with_bit(3, 4, 2, 1 << 7);
        assert_eq!(shard.tag(), 3);
        assert!(shard.test(2, 1 << 7));
        assert!(!shard.test(0, 1 << 7));
        assert!(!shard.test(2, 1 << 6));
    }

    #[test]
    fn set_clear_and_clear_all() {
        let shard = Shard::<u8>::with_bit(0, 2, 0, 0);
        shard.set(1, 1 << 3);
        shard.set(1, 1 << 4);
        shard.clear(1, 1 << 3);
        assert!(!shard.test(1, 1 << 3));
        assert!(shard.test(1, 1 << 4));
        shard.clear_all();
        assert!(!shard.test(1, 1 << 4));
    }

    #[test]
    fn dropped_guard_frees_shard() {
        let guard = Speculative::new(Shard::<u64>::with_bit(1, 8, 0, 1));
        assert!(!guard.as_ptr().is_null());
        drop(guard);
    }

    #[test]
    fn published_guard_hands_over_ownership() {
        let guard = Speculative::new(Shard::<u64>::with_bit(1, 8, 0, 1));
        let raw = guard.as_ptr();
        guard.publish();
        // SAFETY: ownership was relinquished above and nobody else holds `raw`.
        let shard = unsafe { Box::from_raw(raw) };
        assert!(shard.test(0, 1));
    }
}
