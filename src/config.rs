//! Construction-time configuration for [`AtomicBitset`](crate::AtomicBitset).

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::concurrency::atomic::BitWord;

/// Default log2 of bits covered per shard.
pub const DEFAULT_BITSET_WIDTH: u32 = 16;

/// Default retry bound for the collision path.
pub const DEFAULT_MAX_TRIES: usize = 32;

/// Shape of an [`AtomicBitset`](crate::AtomicBitset): directory size, shard
/// width and retry bound. Fixed once the bitset is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitsetConfig {
    /// Number of directory slots.
    pub capacity: usize,
    /// log2 of the number of bits covered by one shard.
    #[serde(default = "default_bitset_width")]
    pub bitset_width: u32,
    /// Upper bound on attempts per call in the collision path.
    #[serde(default = "default_max_tries")]
    pub max_tries: usize,
}

fn default_bitset_width() -> u32 {
    DEFAULT_BITSET_WIDTH
}

fn default_max_tries() -> usize {
    DEFAULT_MAX_TRIES
}

impl BitsetConfig {
    /// A config with `capacity` slots and default width and retry bound.
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            bitset_width: DEFAULT_BITSET_WIDTH,
            max_tries: DEFAULT_MAX_TRIES,
        }
    }

    /// Sets the shard width (log2 of bits per shard).
    pub const fn with_bitset_width(mut self, bitset_width: u32) -> Self {
        self.bitset_width = bitset_width;
        self
    }

    /// Sets the retry bound.
    pub const fn with_max_tries(mut self, max_tries: usize) -> Self {
        self.max_tries = max_tries;
        self
    }

    /// Smallest power-of-two capacity whose domain covers `positions` bits
    /// with shards of `2^bitset_width` bits.
    ///
    /// The result may still fail [`validate`](Self::validate) if the domain
    /// overflows `usize`.
    pub fn for_positions(positions: usize, bitset_width: u32) -> Self {
        let shards = if bitset_width >= usize::BITS {
            1
        } else {
            positions.div_ceil(1usize << bitset_width).max(1)
        };
        let capacity = shards.checked_next_power_of_two().unwrap_or(shards);
        Self::new(capacity).with_bitset_width(bitset_width)
    }

    /// Parses a config from JSON. Omitted `bitset_width` / `max_tries` take
    /// their defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] if the input is not a valid config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Number of addressable positions (`capacity × 2^bitset_width`), or
    /// `None` on overflow.
    pub fn len_bits(&self) -> Option<usize> {
        if self.bitset_width >= usize::BITS {
            return None;
        }
        self.capacity.checked_mul(1usize << self.bitset_width)
    }

    /// Checks the config against word type `W`.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate<W: BitWord>(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.max_tries == 0 {
            return Err(ConfigError::ZeroTries);
        }
        if self.bitset_width < W::BITS.trailing_zeros() {
            return Err(ConfigError::WidthTooSmall {
                bitset_width: self.bitset_width,
                word_bits: W::BITS,
            });
        }
        if self.len_bits().is_none() {
            return Err(ConfigError::DomainOverflow {
                capacity: self.capacity,
                bitset_width: self.bitset_width,
            });
        }
        Ok(())
    }
}

/// Rejected [`BitsetConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The directory must have at least one slot.
    ZeroCapacity,
    /// At least one attempt per call is required.
    ZeroTries,
    /// A shard must hold at least one whole word.
    WidthTooSmall {
        /// Requested log2 of bits per shard.
        bitset_width: u32,
        /// Bits in the backing word.
        word_bits: u32,
    },
    /// `capacity × 2^bitset_width` does not fit in `usize`.
    DomainOverflow {
        /// Requested slot count.
        capacity: usize,
        /// Requested log2 of bits per shard.
        bitset_width: u32,
    },
    /// The serialized config could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCapacity => f.write_str("bitset capacity must be non-zero"),
            ConfigError::ZeroTries => f.write_str("max_tries must be non-zero"),
            ConfigError::WidthTooSmall {
                bitset_width,
                word_bits,
            } => write!(
                f,
                "shard of 2^{bitset_width} bits cannot hold a {word_bits}-bit word"
            ),
            ConfigError::DomainOverflow {
                capacity,
                bitset_width,
            } => write!(
                f,
                "{capacity} shards of 2^{bitset_width} bits overflow the position domain"
            ),
            ConfigError::Parse(msg) => write!(f, "invalid bitset config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
