//! The logger collaborator: an informational/warning-level sink the
//! engine reports build and lookup events to.

/// A sink for the engine's diagnostic output.
///
/// Kept as a trait (rather than calling `tracing` macros directly)
/// so applications that already own a logging strategy can route the
/// engine's messages through it instead.
pub trait Logger: Send + Sync {
    /// Log an informational message: build-time summaries, and a
    /// per-lookup hit/miss report.
    fn info(&self, message: &str);

    /// Log a message worth an operator's attention, but not fatal to
    /// the call that produced it.
    fn warn(&self, message: &str);
}

/// The default [`Logger`], forwarding to the `tracing` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}
