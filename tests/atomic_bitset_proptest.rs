#![cfg(not(loom))]

use lockfree_bitset::{AtomicBitset, BitsetConfig, Status};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
enum Operation {
    Set(usize),
    Reset(usize),
    Test(usize),
    ResetAll,
}

// 8 shards of 16 bits: 128 valid positions, probe a little past the end.
const DOMAIN: usize = 128;

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        4 => (0..DOMAIN + 8).prop_map(Operation::Set),
        3 => (0..DOMAIN + 8).prop_map(Operation::Reset),
        4 => (0..DOMAIN + 8).prop_map(Operation::Test),
        1 => Just(Operation::ResetAll),
    ]
}

proptest! {
    #[test]
    fn test_bitset_matches_set_model(ops in proptest::collection::vec(operation(), 1..200)) {
        let bits: AtomicBitset<u8> =
            AtomicBitset::with_config(BitsetConfig::new(8).with_bitset_width(4)).unwrap();
        let mut model = BTreeSet::new();
        let mut touched = BTreeSet::new();

        for op in ops {
            match op {
                Operation::Set(pos) => {
                    let status = bits.set(pos);
                    if pos < DOMAIN {
                        prop_assert_eq!(status, Status::Success);
                        model.insert(pos);
                        touched.insert(pos >> 4);
                    } else {
                        prop_assert_eq!(status, Status::Failed);
                    }
                }
                Operation::Reset(pos) => {
                    let status = bits.reset(pos);
                    if pos < DOMAIN {
                        prop_assert_eq!(status, Status::Success);
                        model.remove(&pos);
                    } else {
                        prop_assert_eq!(status, Status::NotFound);
                    }
                }
                Operation::Test(pos) => {
                    let expected = if pos >= DOMAIN {
                        Status::NotFound
                    } else if model.contains(&pos) {
                        Status::Yes
                    } else {
                        Status::No
                    };
                    prop_assert_eq!(bits.test(pos), expected, "test mismatch at {}", pos);
                }
                Operation::ResetAll => {
                    prop_assert_eq!(bits.reset_all(), Status::Success);
                    model.clear();
                }
            }
        }

        // Only shards that some `set` touched were ever allocated.
        prop_assert_eq!(bits.installed_shards(), touched.len());
        for pos in 0..DOMAIN {
            let expected = if model.contains(&pos) { Status::Yes } else { Status::No };
            prop_assert_eq!(bits.test(pos), expected, "final content mismatch at {}", pos);
        }
    }

    #[test]
    fn test_codec_round_trips(width in 5u32..20, pos in 0usize..(1 << 28)) {
        let codec = lockfree_bitset::PositionCodec::new(width, 32);
        let at = codec.decode(pos);
        prop_assert!(at.word < codec.words_per_shard());
        prop_assert!(at.offset < 32);
        prop_assert_eq!(codec.encode(at), pos);
    }
}
