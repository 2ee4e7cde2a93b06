//! Concurrent data structures.
//!
//! Everything here is safe to share across threads by reference: operations
//! take `&self` and synchronize through hardware atomics only, never locks.

pub mod atomic;
