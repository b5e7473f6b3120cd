//! Keyboard shortcut system for Clinic Shell.
//!
//! This module provides:
//!
//! - [`KeyChord`]: A key label with tri-state modifier requirements
//! - [`ShortcutBinding`]: A chord plus description, category, context and action
//! - [`ShortcutRegistry`]: The shared, ordered list of active bindings
//! - [`ShortcutDispatcher`]: Routes physical key presses to at most one binding
//! - [`help_entries`]: Rendered listing for a help surface
//! - Built-in binding sets in [`presets`]
//!
//! # Example
//!
//! ```
//! use clinic_shell::shortcut::{
//!     DispatchOutcome, KeyChord, KeyConvention, KeyPress, KeyboardModifiers,
//!     ShortcutBinding, ShortcutDispatcher, ShortcutRegistry,
//! };
//! use std::sync::Arc;
//!
//! let registry = ShortcutRegistry::new();
//! registry.register(ShortcutBinding::new(KeyChord::shift("d"), "Go to Dashboard", || Ok(())));
//!
//! let dispatcher = ShortcutDispatcher::with_sink(
//!     registry.clone(),
//!     KeyConvention::Control,
//!     Arc::new(clinic_shell::TracingSink),
//! );
//! let mut press = KeyPress::new("D", KeyboardModifiers::SHIFT);
//! assert_eq!(
//!     dispatcher.dispatch(&mut press),
//!     DispatchOutcome::Fired { description: "Go to Dashboard".into() }
//! );
//! ```

mod binding;
mod chord;
mod dispatcher;
mod event;
mod help;
pub mod presets;
mod registry;

pub use binding::{ShortcutAction, ShortcutBinding, ShortcutCategory, ShortcutContext};
pub use chord::{ChordParseError, KeyChord, KeyConvention, ModifierRequirements};
pub use dispatcher::{DispatchOutcome, OverlayState, ShortcutDispatcher, TYPING_SAFE_KEYS};
pub use event::{InputTarget, KeyPress, KeyboardModifiers};
pub use help::{HelpEntry, help_by_category, help_entries};
pub use presets::{AnalysisActions, analysis_bindings, baseline_bindings, patient_switch_bindings};
pub use registry::{BindingGuard, ShortcutRegistry};
