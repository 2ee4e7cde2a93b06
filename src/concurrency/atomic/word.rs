//! Word types that can back a shard.
//!
//! A [`BitWord`] is a plain unsigned integer paired with its atomic
//! counterpart. Only the handful of operations the bitset needs are exposed:
//! load, store, fetch-or and fetch-and.

use core::fmt;

use num_traits::{PrimInt, Unsigned};

use crate::sync::{AtomicU16, AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering};

/// An unsigned integer type usable as the backing word of a shard.
pub trait BitWord: PrimInt + Unsigned + fmt::Debug + Send + Sync + 'static {
    /// The atomic cell holding one word.
    type Atomic: Send + Sync;

    /// Number of bits in one word. Always a power of two.
    const BITS: u32;

    /// Creates a new atomic word holding `value`.
    fn new_atomic(value: Self) -> Self::Atomic;

    /// Loads the current value.
    fn load(atomic: &Self::Atomic, order: Ordering) -> Self;

    /// Stores a new value.
    fn store(atomic: &Self::Atomic, value: Self, order: Ordering);

    /// Bitwise OR with the current value, returning the previous value.
    fn fetch_or(atomic: &Self::Atomic, value: Self, order: Ordering) -> Self;

    /// Bitwise AND with the current value, returning the previous value.
    fn fetch_and(atomic: &Self::Atomic, value: Self, order: Ordering) -> Self;

    /// Single-bit mask for `offset`.
    ///
    /// `offset` must be `< Self::BITS`.
    #[inline(always)]
    fn mask(offset: u32) -> Self {
        debug_assert!(offset < Self::BITS);
        Self::one() << offset as usize
    }
}

macro_rules! impl_bit_word {
    ($($word:ty => $atomic:ty),* $(,)?) => {
        $(
            impl BitWord for $word {
                type Atomic = $atomic;

                const BITS: u32 = <$word>::BITS;

                #[inline(always)]
                fn new_atomic(value: Self) -> Self::Atomic {
                    <$atomic>::new(value)
                }

                #[inline(always)]
                fn load(atomic: &Self::Atomic, order: Ordering) -> Self {
                    atomic.load(order)
                }

                #[inline(always)]
                fn store(atomic: &Self::Atomic, value: Self, order: Ordering) {
                    atomic.store(value, order);
                }

                #[inline(always)]
                fn fetch_or(atomic: &Self::Atomic, value: Self, order: Ordering) -> Self {
                    atomic.fetch_or(value, order)
                }

                #[inline(always)]
                fn fetch_and(atomic: &Self::Atomic, value: Self, order: Ordering) -> Self {
                    atomic.fetch_and(value, order)
                }
            }
        )*
    };
}

impl_bit_word! {
    u8 => AtomicU8,
    u16 => AtomicU16,
    u32 => AtomicU32,
    u64 => AtomicU64,
    usize => AtomicUsize,
}
