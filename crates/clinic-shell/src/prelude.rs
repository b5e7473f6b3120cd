//! Prelude module for Clinic Shell.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use clinic_shell::prelude::*;
//! ```
//!
//! This provides access to:
//! - The shell service owner (`Shell`, `ShellSettings`)
//! - Shortcuts (`KeyChord`, `ShortcutBinding`, `ShortcutRegistry`, `KeyPress`)
//! - Navigation (`Navigator`, `Route`)
//! - The event bus and its payloads (`EventBus`, `PatientCreated`, ...)
//! - Callback errors and diagnostic sinks

// ============================================================================
// Shell
// ============================================================================

pub use crate::Shell;
pub use crate::settings::{ConventionSetting, DiagnosticsSettings, ShellSettings};

// ============================================================================
// Shortcuts
// ============================================================================

pub use crate::shortcut::{
    AnalysisActions, BindingGuard, DispatchOutcome, HelpEntry, InputTarget, KeyChord,
    KeyConvention, KeyPress, KeyboardModifiers, ModifierRequirements, OverlayState,
    ShortcutBinding, ShortcutCategory, ShortcutContext, ShortcutDispatcher, ShortcutRegistry,
};

// ============================================================================
// Navigation
// ============================================================================

pub use crate::navigation::{Navigator, Route};

// ============================================================================
// Event Bus
// ============================================================================

pub use clinic_shell_core::{
    BusEvent, Channel, ChannelEvent, EventBus, PatientCreated, PatientRecord, Subscription,
    SubscriptionId, TranscriptStatus, TranscriptUpdated, VisitCreated, VisitRecord,
};

// ============================================================================
// Errors and Diagnostics
// ============================================================================

pub use clinic_shell_core::{
    DiagnosticSink, HandlerError, HandlerResult, MemorySink, TracingSink,
};
