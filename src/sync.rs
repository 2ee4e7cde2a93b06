//! Atomic types used by the crate.
//!
//! Under `cfg(loom)` these resolve to loom's model-checked atomics so the
//! publish protocol can be explored exhaustively; otherwise they are the
//! plain `core` atomics.

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{
    AtomicPtr, AtomicU16, AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering,
};

#[cfg(not(loom))]
pub(crate) use core::sync::atomic::{
    AtomicPtr, AtomicU16, AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering,
};
