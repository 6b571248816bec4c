//! Logging facilities for Horizon GridKit.
//!
//! GridKit uses the `tracing` crate for instrumentation. To see logs, install
//! a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_gridkit=debug")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every subsystem logs under one of the [`targets`], so a filter such as
//! `horizon_gridkit::debounce=trace` isolates the debouncer's per-notification
//! flow.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_gridkit_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_gridkit_core::signal";
    /// UI-context dispatch target.
    pub const DISPATCH: &str = "horizon_gridkit_core::dispatch";
    /// Async runtime target.
    pub const RUNTIME: &str = "horizon_gridkit_core::runtime";
    /// Debounced row reactor target.
    pub const DEBOUNCE: &str = "horizon_gridkit::debounce";
    /// Grid view and extension target.
    pub const GRID: &str = "horizon_gridkit::grid";
}

/// Span names used throughout Horizon GridKit for tracing.
pub mod span_names {
    /// Performance span wrapping timed operations.
    pub const PERF: &str = "horizon_gridkit::perf";
    /// A single debounced reaction (delay, projection, callback).
    pub const REACTION: &str = "horizon_gridkit::reaction";
}

/// A guard that keeps a performance span entered while alive.
///
/// # Example
///
/// ```
/// use horizon_gridkit_core::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("load_customer");
///     // timed work...
/// } // span exits here
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: span_names::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Warn-level log under the core target.
#[macro_export]
macro_rules! gridkit_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_gridkit_core", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_share_prefixes() {
        assert!(targets::SIGNAL.starts_with(targets::CORE));
        assert!(targets::DISPATCH.starts_with(targets::CORE));
        assert!(targets::RUNTIME.starts_with(targets::CORE));
        assert!(targets::DEBOUNCE.starts_with("horizon_gridkit::"));
    }

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
    }

    #[test]
    fn test_perf_span_uses_perf_target() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let perf = PerfSpan::new("load_customer");
            let target = perf.span.metadata().map(|meta| meta.target());
            assert_eq!(target, Some(span_names::PERF));
        });
    }

    #[test]
    fn test_warn_macro_expands() {
        gridkit_warn!(pending = 3, "drained off the owner thread");
    }
}
