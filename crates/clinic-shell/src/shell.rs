//! The application shell: owner of the registry, dispatcher and event bus.

use std::sync::Arc;

use clinic_shell_core::{DiagnosticSink, EventBus, FanoutSink, MemorySink, RecordedFailure};

use crate::navigation::Navigator;
use crate::settings::ShellSettings;
use crate::shortcut::{
    DispatchOutcome, HelpEntry, KeyConvention, KeyPress, OverlayState, ShortcutCategory,
    ShortcutContext, ShortcutDispatcher, ShortcutRegistry, baseline_bindings, help_by_category,
};

/// Owns the process-wide shortcut and event services.
///
/// UI regions receive handles from the shell rather than reaching for
/// globals: [`registry`](Self::registry) to contribute bindings,
/// [`bus`](Self::bus) to publish and subscribe, and
/// [`overlays`](Self::overlays) to read the help and quick-search flags.
///
/// ```
/// use std::sync::Arc;
/// use clinic_shell::prelude::*;
///
/// let navigator: Arc<dyn Navigator> = Arc::new(|_route: Route| -> HandlerResult { Ok(()) });
/// let settings = ShellSettings {
///     key_convention: ConventionSetting::Control,
///     ..Default::default()
/// };
/// let shell = Shell::new(settings, navigator, Arc::new(TracingSink));
///
/// let mut press = KeyPress::new("?", KeyboardModifiers::SHIFT);
/// shell.handle_key(&mut press);
/// assert!(shell.overlays().is_help_visible());
/// assert!(press.is_default_prevented());
/// ```
pub struct Shell {
    settings: ShellSettings,
    registry: ShortcutRegistry,
    dispatcher: ShortcutDispatcher,
    overlays: OverlayState,
    bus: EventBus,
    captured: Option<Arc<MemorySink>>,
}

impl Shell {
    /// Build the shell services.
    ///
    /// Failures go to `sink`; when `settings.diagnostics.capture` is set they
    /// are also kept in memory for [`captured_failures`](Self::captured_failures).
    pub fn new(
        settings: ShellSettings,
        navigator: Arc<dyn Navigator>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let (sink, captured) = if settings.diagnostics.capture {
            let memory = Arc::new(MemorySink::with_capacity(settings.diagnostics.capacity));
            let sinks: Vec<Arc<dyn DiagnosticSink>> = vec![sink, memory.clone()];
            let fanout: Arc<dyn DiagnosticSink> = Arc::new(FanoutSink::new(sinks));
            (fanout, Some(memory))
        } else {
            (sink, None)
        };

        let convention = settings.convention();
        let overlays = OverlayState::new();
        let registry = ShortcutRegistry::with_baseline(baseline_bindings(navigator, overlays.clone()));
        let dispatcher = ShortcutDispatcher::with_sink(registry.clone(), convention, sink.clone())
            .with_overlays(overlays.clone())
            .with_context_enforcement(settings.enforce_context);
        let bus = EventBus::new(sink);

        tracing::debug!(
            target: "clinic_shell::shortcut",
            ?convention,
            enforce_context = settings.enforce_context,
            capture = captured.is_some(),
            "shell services created"
        );

        Self {
            settings,
            registry,
            dispatcher,
            overlays,
            bus,
            captured,
        }
    }

    /// The settings the shell was built with.
    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    /// Shortcut registry handle.
    pub fn registry(&self) -> &ShortcutRegistry {
        &self.registry
    }

    /// The key-press dispatcher.
    pub fn dispatcher(&self) -> &ShortcutDispatcher {
        &self.dispatcher
    }

    /// Help and quick-search visibility.
    pub fn overlays(&self) -> &OverlayState {
        &self.overlays
    }

    /// Event bus handle.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The key convention in effect.
    pub fn convention(&self) -> KeyConvention {
        self.dispatcher.convention()
    }

    /// Route a physical key press.
    pub fn handle_key(&self, event: &mut KeyPress) -> DispatchOutcome {
        self.dispatcher.dispatch(event)
    }

    /// Report which UI region is active.
    pub fn set_active_context(&self, context: Option<ShortcutContext>) {
        self.dispatcher.set_active_context(context);
    }

    /// Sorted help listing of every active binding.
    pub fn help_entries(&self) -> Vec<HelpEntry> {
        self.dispatcher.help_entries()
    }

    /// Help listing grouped by category.
    pub fn help_by_category(&self) -> Vec<(ShortcutCategory, Vec<HelpEntry>)> {
        help_by_category(&self.registry.snapshot(), self.convention())
    }

    /// Failures kept in memory, oldest first. Empty when capture is off.
    pub fn captured_failures(&self) -> Vec<RecordedFailure> {
        self.captured
            .as_ref()
            .map(|memory| memory.entries())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::Route;
    use crate::settings::ConventionSetting;
    use crate::shortcut::{KeyChord, KeyboardModifiers, ShortcutBinding};
    use clinic_shell_core::{HandlerResult, TracingSink};
    use parking_lot::Mutex;

    fn shell_with(settings: ShellSettings) -> (Shell, Arc<Mutex<Vec<Route>>>) {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let log = visited.clone();
        let navigator: Arc<dyn Navigator> = Arc::new(move |route: Route| -> HandlerResult {
            log.lock().push(route);
            Ok(())
        });
        (Shell::new(settings, navigator, Arc::new(TracingSink)), visited)
    }

    fn control_settings() -> ShellSettings {
        ShellSettings {
            key_convention: ConventionSetting::Control,
            ..Default::default()
        }
    }

    #[test]
    fn test_baseline_installed() {
        let (shell, _) = shell_with(control_settings());
        assert_eq!(shell.registry().baseline_len(), 11);
        assert_eq!(shell.registry().dynamic_len(), 0);
        assert_eq!(shell.convention(), KeyConvention::Control);
    }

    #[test]
    fn test_navigation_shortcut() {
        let (shell, visited) = shell_with(control_settings());
        let mut press = KeyPress::new("T", KeyboardModifiers::SHIFT);
        assert!(shell.handle_key(&mut press).is_handled());
        assert_eq!(*visited.lock(), vec![Route::Transcripts]);
    }

    #[test]
    fn test_captures_failures() {
        let (shell, _) = shell_with(control_settings());
        shell
            .registry()
            .register(ShortcutBinding::new(KeyChord::ctrl("e"), "Export", || panic!("boom")));
        shell.handle_key(&mut KeyPress::new("e", KeyboardModifiers::CTRL));

        let failures = shell.captured_failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].panicked);
    }

    #[test]
    fn test_capture_disabled() {
        let mut settings = control_settings();
        settings.diagnostics.capture = false;
        let (shell, _) = shell_with(settings);
        shell
            .registry()
            .register(ShortcutBinding::new(KeyChord::ctrl("e"), "Export", || panic!("boom")));
        shell.handle_key(&mut KeyPress::new("e", KeyboardModifiers::CTRL));
        assert!(shell.captured_failures().is_empty());
    }

    #[test]
    fn test_help_grouping() {
        let (shell, _) = shell_with(control_settings());
        let groups = shell.help_by_category();
        assert_eq!(groups[0].0, ShortcutCategory::Navigation);
        assert_eq!(groups[0].1.len(), 5);
        assert_eq!(groups.last().map(|g| g.0), Some(ShortcutCategory::General));
        assert_eq!(shell.help_entries().len(), 11);
    }

    #[test]
    fn test_enforce_context_from_settings() {
        let mut settings = control_settings();
        settings.enforce_context = true;
        let (shell, _) = shell_with(settings);
        assert!(shell.dispatcher().enforces_context());
        shell.set_active_context(Some(ShortcutContext::Analysis));
        assert_eq!(shell.dispatcher().active_context(), Some(ShortcutContext::Analysis));
    }
}
