//! Logging conventions for the codec.
//!
//! All events go through `tracing` with target `ironbeam_columnar` and carry an
//! `event` field. The crate never installs a subscriber; applications configure
//! one (for example with `tracing_subscriber`).
//!
//! - `event`: snake_case event name (required)
//! - `component`: `schema`, `reader` or `writer`
//! - Use `%` for Display, `?` for Debug formatting

/// Target for all log events emitted by this crate.
pub(crate) const CODEC_TARGET: &str = "ironbeam_columnar";

/// Info-level event.
///
/// ```ignore
/// log_info!(
///     component = "reader",
///     event = "read_completed",
///     rows = total,
/// );
/// ```
macro_rules! log_info {
    ($($field:tt)*) => {
        ::tracing::info!(target: $crate::observability::CODEC_TARGET, $($field)*)
    };
}

/// Debug-level event.
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::CODEC_TARGET, $($field)*)
    };
}

/// Warn-level event.
macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::observability::CODEC_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_info;
pub(crate) use log_warn;
