//! Logging infrastructure for ndcompare.
//!
//! ndcompare uses `tracing` for structured logging. All events use target
//! "ndcompare" and include an `event` field for filtering.
//!
//! The library never initializes a global subscriber; applications configure
//! tracing via `tracing_subscriber` or similar.
//!
//! ## Conventions
//!
//! - `event`: snake_case event name (required)
//! - `component`: module/subsystem (e.g., "completion", "capability")
//! - Use `%` for Display, `?` for Debug formatting

/// Target for all ndcompare log events.
pub(crate) const NDCOMPARE_TARGET: &str = "ndcompare";

/// Macro for debug-level log events.
///
/// # Example
/// ```ignore
/// log_debug!(
///     component = "completion",
///     event = "definition_completed",
///     type_name = name,
/// );
/// ```
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::NDCOMPARE_TARGET, $($field)*)
    };
}

/// Macro for trace-level log events.
macro_rules! log_trace {
    ($($field:tt)*) => {
        ::tracing::trace!(target: $crate::observability::NDCOMPARE_TARGET, $($field)*)
    };
}

/// Macro for warn-level log events.
macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::observability::NDCOMPARE_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_trace;
pub(crate) use log_warn;
