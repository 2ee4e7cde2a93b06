//! Lock-free atomic bitset and its building blocks.
//!
//! - [`word`]: the unsigned word types a shard can be built from.
//! - [`codec`]: position ⇄ (shard, word, offset) arithmetic.
//! - [`bitset`]: the directory + lazily published shards.

pub mod bitset;
pub mod codec;
mod shard;
pub mod word;

pub use bitset::AtomicBitset;
pub use codec::{Coordinates, PositionCodec};
pub use word::BitWord;
