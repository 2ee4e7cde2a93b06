//! Position codec: bit position ⇄ (shard, word, offset).
//!
//! The directory is indexed directly, so decoding is pure shift/mask
//! arithmetic with no hashing.

/// Location of one bit inside the two-level layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinates {
    /// Directory slot index.
    pub shard: usize,
    /// Word index inside the shard.
    pub word: usize,
    /// Bit offset inside the word.
    pub offset: u32,
}

/// Maps bit positions to [`Coordinates`] for a fixed shard width and word size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionCodec {
    bitset_width: u32,
    word_shift: u32,
}

impl PositionCodec {
    /// Creates a codec for shards covering `2^bitset_width` bits, packed into
    /// words of `word_bits` bits.
    ///
    /// # Panics
    /// Panics if `word_bits` is not a power of two, or if a shard would be
    /// smaller than a single word.
    pub fn new(bitset_width: u32, word_bits: u32) -> Self {
        assert!(word_bits.is_power_of_two(), "word size must be a power of two");
        let word_shift = word_bits.trailing_zeros();
        assert!(
            bitset_width >= word_shift,
            "shard width {bitset_width} is narrower than a {word_bits}-bit word"
        );
        Self {
            bitset_width,
            word_shift,
        }
    }

    /// log2 of the number of bits per shard.
    #[inline(always)]
    pub fn bitset_width(&self) -> u32 {
        self.bitset_width
    }

    /// Number of bits covered by one shard.
    #[inline(always)]
    pub fn bits_per_shard(&self) -> usize {
        1usize << self.bitset_width
    }

    /// Number of words stored in one shard.
    #[inline(always)]
    pub fn words_per_shard(&self) -> usize {
        1usize << (self.bitset_width - self.word_shift)
    }

    /// Splits `pos` into its coordinates.
    #[inline(always)]
    pub fn decode(&self, pos: usize) -> Coordinates {
        let shard = pos >> self.bitset_width;
        let sub = pos & (self.bits_per_shard() - 1);
        Coordinates {
            shard,
            word: sub >> self.word_shift,
            offset: (sub & ((1usize << self.word_shift) - 1)) as u32,
        }
    }

    /// Inverse of [`decode`](Self::decode).
    #[inline(always)]
    pub fn encode(&self, coords: Coordinates) -> usize {
        (coords.shard << self.bitset_width) | (coords.word << self.word_shift) | coords.offset as usize
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn decodes_small_shards() {
        // 16 bits per shard, 8-bit words.
        let codec = PositionCodec::new(4, 8);
        assert_eq!(codec.bits_per_shard(), 16);
        assert_eq!(codec.words_per_shard(), 2);

        assert_eq!(
            codec.decode(5),
            Coordinates {
                shard: 0,
                word: 0,
                offset: 5
            }
        );
        assert_eq!(
            codec.decode(100),
            Coordinates {
                shard: 6,
                word: 0,
                offset: 4
            }
        );
        assert_eq!(
            codec.decode(127),
            Coordinates {
                shard: 7,
                word: 1,
                offset: 7
            }
        );
    }

    #[test]
    fn single_word_shard() {
        let codec = PositionCodec::new(5, 32);
        assert_eq!(codec.words_per_shard(), 1);
        let c = codec.decode(70);
        assert_eq!((c.shard, c.word, c.offset), (2, 0, 6));
    }

    #[test]
    fn encode_inverts_decode() {
        let codec = PositionCodec::new(16, 32);
        for pos in [0usize, 1, 31, 32, 65_535, 65_536, 1 << 20, (1 << 24) + 12_345] {
            assert_eq!(codec.encode(codec.decode(pos)), pos);
        }
    }

    #[test]
    #[should_panic(expected = "narrower")]
    fn rejects_shard_smaller_than_word() {
        let _ = PositionCodec::new(3, 64);
    }
}
