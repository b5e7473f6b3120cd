//! Clinic Shell - keyboard shortcuts and cross-region events for a clinical
//! documentation front end.
//!
//! This is the main crate. It re-exports the event bus and diagnostics from
//! `clinic-shell-core` and adds the shortcut system, navigation, settings
//! and the [`Shell`] that owns them.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use clinic_shell::prelude::*;
//!
//! let navigator: Arc<dyn Navigator> = Arc::new(|route: Route| -> HandlerResult {
//!     println!("navigate to {}", route.path());
//!     Ok(())
//! });
//! let shell = Shell::new(ShellSettings::default(), navigator, Arc::new(TracingSink));
//!
//! // The patient list announces new patients to whoever listens.
//! let _sub = shell.bus().subscribe_scoped(|event: &PatientCreated| {
//!     println!("refresh list for {}", event.patient.full_name());
//!     Ok(())
//! });
//!
//! // Every physical key press goes through the shell.
//! let mut press = KeyPress::new("D", KeyboardModifiers::SHIFT);
//! shell.handle_key(&mut press);
//! ```

pub use clinic_shell_core::*;

pub mod navigation;
pub mod prelude;
pub mod settings;
mod shell;
pub mod shortcut;

pub use navigation::{Navigator, Route};
pub use settings::{ConventionSetting, DiagnosticsSettings, SettingsError, SettingsFormat, ShellSettings};
pub use shell::Shell;
