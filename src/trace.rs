//! Crate-internal logging hooks.
//!
//! `trace_event!(level, ...)` forwards to the `tracing` macro of the same
//! name when the `tracing` feature is enabled and compiles to nothing
//! otherwise, so the hot paths carry no logging cost by default.

#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($level:ident, $($arg:tt)+) => {{}};
}

pub(crate) use trace_event;
