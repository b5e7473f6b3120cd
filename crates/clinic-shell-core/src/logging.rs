//! Logging facilities for Clinic Shell.
//!
//! Clinic Shell uses the `tracing` crate for instrumentation. Nothing is
//! printed unless the host application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("clinic_shell=debug,clinic_shell_core=debug")
//!     .init();
//! ```
//!
//! Callback failures are additionally routed through a
//! [`DiagnosticSink`](crate::diagnostics::DiagnosticSink) so hosts can
//! inspect them without a subscriber.

/// Span names used throughout Clinic Shell for tracing.
pub mod span_names {
    /// Key-press dispatch span.
    pub const DISPATCH: &str = "clinic_shell::dispatch";
    /// Event-bus publish span.
    pub const PUBLISH: &str = "clinic_shell::publish";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "clinic_shell_core";
    /// Event bus target.
    pub const EVENT_BUS: &str = "clinic_shell_core::event_bus";
    /// Diagnostic sink target.
    pub const DIAGNOSTICS: &str = "clinic_shell_core::diagnostics";
    /// Shortcut registry and dispatcher target.
    pub const SHORTCUT: &str = "clinic_shell::shortcut";
    /// Settings loading target.
    pub const SETTINGS: &str = "clinic_shell::settings";
}

/// Macros for common tracing patterns.
///
/// Thin wrappers around the `tracing` macros with a consistent target.
#[macro_export]
macro_rules! shell_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "clinic_shell_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! shell_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "clinic_shell_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! shell_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "clinic_shell_core", $($arg)*)
    };
}
