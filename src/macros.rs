/// Emits a trace-level event through `tracing` when the `tracing` feature is
/// enabled, and expands to nothing otherwise.
///
/// Accepts the same arguments as [`tracing::trace!`]. The arguments are not
/// evaluated when the feature is disabled.
///
/// [`tracing::trace!`]: https://docs.rs/tracing/latest/tracing/macro.trace.html
macro_rules! trace_event {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            ::tracing::trace!(target: "unique_any", $($arg)*);
        }
    };
}
