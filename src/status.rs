//! Flat status vocabulary shared by every bitset operation.

use core::fmt;

/// Outcome of a bitset operation.
///
/// `Failed` and `NotFound` are never transient contention: they only appear
/// when a position cannot be addressed by the configured directory, so
/// callers should treat them as a configuration error rather than retry.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The operation took effect.
    Success,
    /// `set` could not reach the bit.
    Failed,
    /// `reset`/`test` could not reach the bit.
    NotFound,
    /// `test`: the bit is set.
    Yes,
    /// `test`: the bit is clear.
    No,
}

impl Status {
    /// Returns `true` for [`Status::Success`].
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Returns `true` for [`Status::Yes`].
    #[inline]
    pub fn is_yes(self) -> bool {
        matches!(self, Status::Yes)
    }

    /// Returns `true` for [`Status::Failed`] and [`Status::NotFound`].
    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failed | Status::NotFound)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Success => "success",
            Status::Failed => "failed",
            Status::NotFound => "not found",
            Status::Yes => "yes",
            Status::No => "no",
        })
    }
}
