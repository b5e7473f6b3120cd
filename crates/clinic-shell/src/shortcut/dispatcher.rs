//! Key-press dispatch.
//!
//! [`ShortcutDispatcher::dispatch`] is the single entry point for physical
//! key presses. It scans the registry snapshot in order and fires at most one
//! binding per press:
//!
//! 1. The key label is compared case-insensitively and every constrained
//!    modifier must match. Under [`KeyConvention::Command`] the primary
//!    requirement is tested against the meta key.
//! 2. On the first match, a binding that suppresses the default cancels it
//!    before anything else happens.
//! 3. While a text-entry surface has focus, the match is skipped (and the
//!    scan continues) unless its key is one of [`TYPING_SAFE_KEYS`].
//! 4. The action runs. A returned error or a panic is handed to the
//!    diagnostic sink and never reaches the caller.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clinic_shell_core::{DiagnosticSink, FailureSite, InvocationFailure, TracingSink};
use parking_lot::RwLock;

use super::binding::{ShortcutBinding, ShortcutContext};
use super::chord::KeyConvention;
use super::event::KeyPress;
use super::help::{HelpEntry, help_entries};
use super::registry::ShortcutRegistry;

/// Keys whose bindings fire even while the user is typing: the cancel key,
/// the help key and the quick-search key.
pub const TYPING_SAFE_KEYS: [&str; 3] = ["escape", "?", "k"];

fn is_typing_safe(binding: &ShortcutBinding) -> bool {
    TYPING_SAFE_KEYS.contains(&binding.chord().normalized_key())
}

// =============================================================================
// Overlay State
// =============================================================================

#[derive(Debug, Default)]
struct OverlayFlags {
    help: AtomicBool,
    quick_search: AtomicBool,
}

/// Visibility flags for the help overlay and the quick-search box.
///
/// Set by the baseline `?` and primary+K bindings, reset by Escape. UI
/// surfaces read the flags to decide whether to render themselves. Clones
/// share the same flags.
#[derive(Debug, Clone, Default)]
pub struct OverlayState {
    flags: Arc<OverlayFlags>,
}

impl OverlayState {
    /// Create hidden overlays.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the help overlay is visible.
    pub fn is_help_visible(&self) -> bool {
        self.flags.help.load(Ordering::Acquire)
    }

    /// Whether the quick-search box is visible.
    pub fn is_quick_search_visible(&self) -> bool {
        self.flags.quick_search.load(Ordering::Acquire)
    }

    /// Show or hide the help overlay.
    pub fn set_help_visible(&self, visible: bool) {
        self.flags.help.store(visible, Ordering::Release);
    }

    /// Show or hide the quick-search box.
    pub fn set_quick_search_visible(&self, visible: bool) {
        self.flags.quick_search.store(visible, Ordering::Release);
    }

    /// Hide both overlays.
    pub fn dismiss_all(&self) {
        self.set_help_visible(false);
        self.set_quick_search_visible(false);
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Result of dispatching one key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A binding fired and its action succeeded.
    Fired {
        /// Description of the binding that fired.
        description: String,
    },
    /// A binding fired and its action failed; the failure went to the sink.
    Failed {
        /// Description of the binding that fired.
        description: String,
    },
    /// No binding fired.
    NoMatch,
}

impl DispatchOutcome {
    /// Whether a binding's action ran, successfully or not.
    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::NoMatch)
    }

    /// Description of the binding that ran, if any.
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Fired { description } | Self::Failed { description } => Some(description.as_str()),
            Self::NoMatch => None,
        }
    }
}

/// Routes key presses to the bindings of a [`ShortcutRegistry`].
pub struct ShortcutDispatcher {
    registry: ShortcutRegistry,
    overlays: OverlayState,
    convention: KeyConvention,
    sink: Arc<dyn DiagnosticSink>,
    enforce_context: bool,
    active_context: RwLock<Option<ShortcutContext>>,
}

impl ShortcutDispatcher {
    /// Create a dispatcher over `registry` for the current platform,
    /// reporting failures through `tracing`.
    pub fn new(registry: ShortcutRegistry) -> Self {
        Self::with_sink(registry, KeyConvention::current(), Arc::new(TracingSink))
    }

    /// Create a dispatcher with an explicit key convention and sink.
    pub fn with_sink(
        registry: ShortcutRegistry,
        convention: KeyConvention,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            registry,
            overlays: OverlayState::new(),
            convention,
            sink,
            enforce_context: false,
            active_context: RwLock::new(None),
        }
    }

    /// Use `overlays` as this dispatcher's overlay flags.
    pub fn with_overlays(mut self, overlays: OverlayState) -> Self {
        self.overlays = overlays;
        self
    }

    /// Only consider bindings whose context is global or the active one.
    pub fn with_context_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_context = enforce;
        self
    }

    /// The registry this dispatcher scans.
    pub fn registry(&self) -> &ShortcutRegistry {
        &self.registry
    }

    /// The overlay flags.
    pub fn overlays(&self) -> &OverlayState {
        &self.overlays
    }

    /// The key convention used for matching and display.
    pub fn convention(&self) -> KeyConvention {
        self.convention
    }

    /// Whether bindings are filtered by context.
    pub fn enforces_context(&self) -> bool {
        self.enforce_context
    }

    /// Report which UI region is active.
    pub fn set_active_context(&self, context: Option<ShortcutContext>) {
        *self.active_context.write() = context;
    }

    /// The UI region last reported active.
    pub fn active_context(&self) -> Option<ShortcutContext> {
        *self.active_context.read()
    }

    /// Help entries for every active binding, rendered for this convention.
    pub fn help_entries(&self) -> Vec<HelpEntry> {
        help_entries(&self.registry.snapshot(), self.convention)
    }

    fn in_active_context(&self, binding: &ShortcutBinding) -> bool {
        match binding.context() {
            None | Some(ShortcutContext::Global) => true,
            Some(context) => self.active_context() == Some(context),
        }
    }

    /// Handle one physical key press.
    #[tracing::instrument(
        name = "clinic_shell::dispatch",
        skip_all,
        target = "clinic_shell::shortcut",
        level = "trace",
        fields(key = %event.key, focus = ?event.target)
    )]
    pub fn dispatch(&self, event: &mut KeyPress) -> DispatchOutcome {
        if !event.is_modifier_key() {
            tracing::trace!(
                target: "clinic_shell::shortcut",
                modifiers = ?event.modifiers,
                "key press"
            );
        }

        let key = event.key.to_lowercase();
        let typing = event.target.is_text_entry();

        for binding in self.registry.snapshot() {
            if !binding
                .chord()
                .matches_normalized(&key, event.modifiers, self.convention)
            {
                continue;
            }
            if self.enforce_context && !self.in_active_context(&binding) {
                continue;
            }

            if binding.suppresses_default() {
                event.prevent_default();
            }

            if typing && !is_typing_safe(&binding) {
                tracing::trace!(
                    target: "clinic_shell::shortcut",
                    description = binding.description(),
                    "skipping shortcut while typing"
                );
                continue;
            }

            tracing::debug!(
                target: "clinic_shell::shortcut",
                chord = %binding.chord().display(self.convention),
                description = binding.description(),
                "executing shortcut"
            );

            let description = binding.description().to_string();
            return match binding.invoke() {
                Ok(()) => DispatchOutcome::Fired { description },
                Err(error) => {
                    let site = FailureSite::Action {
                        chord: binding.chord().display(self.convention),
                        description: description.clone(),
                    };
                    self.sink.record(InvocationFailure::new(site, error));
                    DispatchOutcome::Failed { description }
                }
            };
        }

        DispatchOutcome::NoMatch
    }
}

impl fmt::Debug for ShortcutDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutDispatcher")
            .field("registry", &self.registry)
            .field("convention", &self.convention)
            .field("enforce_context", &self.enforce_context)
            .field("active_context", &self.active_context())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(ShortcutDispatcher: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::chord::{KeyChord, ModifierRequirements};
    use crate::shortcut::event::{InputTarget, KeyboardModifiers};
    use clinic_shell_core::{HandlerError, MemorySink};
    use parking_lot::Mutex;

    struct Fixture {
        registry: ShortcutRegistry,
        sink: Arc<MemorySink>,
        dispatcher: ShortcutDispatcher,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    fn fixture(convention: KeyConvention) -> Fixture {
        let registry = ShortcutRegistry::new();
        let sink = Arc::new(MemorySink::new());
        let dispatcher = ShortcutDispatcher::with_sink(registry.clone(), convention, sink.clone());
        Fixture {
            registry,
            sink,
            dispatcher,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    impl Fixture {
        fn bind(&self, chord: KeyChord, name: &'static str) -> ShortcutBinding {
            let log = self.log.clone();
            ShortcutBinding::new(chord, name, move || {
                log.lock().push(name);
                Ok(())
            })
        }

        fn fired(&self) -> Vec<&'static str> {
            self.log.lock().clone()
        }
    }

    #[test]
    fn test_fires_first_match_only() {
        let fx = fixture(KeyConvention::Control);
        fx.registry.register(fx.bind(KeyChord::key_only("x"), "first"));
        fx.registry
            .register(fx.bind(KeyChord::new("x", ModifierRequirements::ANY.with_alt(false)), "second"));

        let outcome = fx.dispatcher.dispatch(&mut KeyPress::new("x", KeyboardModifiers::NONE));
        assert_eq!(outcome, DispatchOutcome::Fired { description: "first".into() });
        assert_eq!(fx.fired(), vec!["first"]);
    }

    #[test]
    fn test_no_match_leaves_default() {
        let fx = fixture(KeyConvention::Control);
        fx.registry
            .register(fx.bind(KeyChord::ctrl("s"), "save").with_suppress_default(true));

        let mut press = KeyPress::new("s", KeyboardModifiers::NONE);
        assert_eq!(fx.dispatcher.dispatch(&mut press), DispatchOutcome::NoMatch);
        assert!(!press.is_default_prevented());
    }

    #[test]
    fn test_suppress_default_on_match() {
        let fx = fixture(KeyConvention::Control);
        fx.registry
            .register(fx.bind(KeyChord::ctrl("s"), "save").with_suppress_default(true));
        fx.registry.register(fx.bind(KeyChord::key_only("Escape"), "escape"));

        let mut press = KeyPress::new("s", KeyboardModifiers::CTRL);
        fx.dispatcher.dispatch(&mut press);
        assert!(press.is_default_prevented());

        let mut press = KeyPress::new("Escape", KeyboardModifiers::NONE);
        fx.dispatcher.dispatch(&mut press);
        assert!(!press.is_default_prevented());
    }

    #[test]
    fn test_suppression_precedes_typing_guard() {
        let fx = fixture(KeyConvention::Control);
        fx.registry
            .register(fx.bind(KeyChord::ctrl("s"), "save").with_suppress_default(true));

        let mut press =
            KeyPress::new("s", KeyboardModifiers::CTRL).with_target(InputTarget::TextArea);
        assert_eq!(fx.dispatcher.dispatch(&mut press), DispatchOutcome::NoMatch);
        assert!(press.is_default_prevented());
        assert!(fx.fired().is_empty());
    }

    #[test]
    fn test_typing_guard_allows_safe_keys() {
        let fx = fixture(KeyConvention::Control);
        fx.registry.register(fx.bind(KeyChord::key_only("Escape"), "escape"));
        fx.registry.register(fx.bind(KeyChord::key_only("?"), "help"));
        fx.registry.register(fx.bind(KeyChord::ctrl("k"), "search"));
        fx.registry.register(fx.bind(KeyChord::shift("d"), "dashboard"));

        for (key, mods) in [
            ("Escape", KeyboardModifiers::NONE),
            ("?", KeyboardModifiers::SHIFT),
            ("k", KeyboardModifiers::CTRL),
            ("D", KeyboardModifiers::SHIFT),
        ] {
            let mut press = KeyPress::new(key, mods).with_target(InputTarget::TextField);
            fx.dispatcher.dispatch(&mut press);
        }
        assert_eq!(fx.fired(), vec!["escape", "help", "search"]);
    }

    #[test]
    fn test_skipped_match_continues_scan() {
        let fx = fixture(KeyConvention::Control);
        fx.registry.register(fx.bind(KeyChord::key_only("s"), "plain"));
        fx.registry.register(
            fx.bind(KeyChord::new("s", ModifierRequirements::ANY.with_alt(false)), "suppressing")
                .with_suppress_default(true),
        );

        // Neither fires while typing, but the later match still suppresses.
        let mut press = KeyPress::new("s", KeyboardModifiers::NONE).with_target(InputTarget::Editable);
        assert_eq!(fx.dispatcher.dispatch(&mut press), DispatchOutcome::NoMatch);
        assert!(press.is_default_prevented());
        assert!(fx.fired().is_empty());
    }

    #[test]
    fn test_command_convention() {
        let fx = fixture(KeyConvention::Command);
        fx.registry.register(fx.bind(KeyChord::ctrl("u"), "upload"));

        assert_eq!(
            fx.dispatcher.dispatch(&mut KeyPress::new("u", KeyboardModifiers::CTRL)),
            DispatchOutcome::NoMatch
        );
        assert!(fx.dispatcher.dispatch(&mut KeyPress::new("u", KeyboardModifiers::META)).is_handled());
        assert_eq!(fx.fired(), vec!["upload"]);
    }

    #[test]
    fn test_failing_action_reported() {
        let fx = fixture(KeyConvention::Control);
        fx.registry.register(ShortcutBinding::new(KeyChord::ctrl("e"), "Export", || {
            Err(HandlerError::msg("disk full"))
        }));
        fx.registry
            .register(ShortcutBinding::new(KeyChord::ctrl("p"), "Print", || panic!("no printer")));

        let outcome = fx.dispatcher.dispatch(&mut KeyPress::new("e", KeyboardModifiers::CTRL));
        assert_eq!(outcome, DispatchOutcome::Failed { description: "Export".into() });
        let outcome = fx.dispatcher.dispatch(&mut KeyPress::new("p", KeyboardModifiers::CTRL));
        assert_eq!(outcome.description(), Some("Print"));

        let entries = fx.sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "disk full");
        assert_eq!(
            entries[0].site,
            FailureSite::Action {
                chord: "Ctrl + E".into(),
                description: "Export".into()
            }
        );
        assert!(entries[1].panicked);
    }

    #[test]
    fn test_failure_does_not_block_later_presses() {
        let fx = fixture(KeyConvention::Control);
        fx.registry
            .register(ShortcutBinding::new(KeyChord::ctrl("e"), "Export", || panic!("boom")));
        fx.registry.register(fx.bind(KeyChord::ctrl("r"), "refresh"));

        fx.dispatcher.dispatch(&mut KeyPress::new("e", KeyboardModifiers::CTRL));
        fx.dispatcher.dispatch(&mut KeyPress::new("r", KeyboardModifiers::CTRL));
        assert_eq!(fx.fired(), vec!["refresh"]);
    }

    #[test]
    fn test_context_advisory_by_default() {
        let fx = fixture(KeyConvention::Control);
        fx.registry.register(
            fx.bind(KeyChord::ctrl("r"), "refresh")
                .with_context(ShortcutContext::Analysis),
        );
        assert!(fx.dispatcher.dispatch(&mut KeyPress::new("r", KeyboardModifiers::CTRL)).is_handled());
    }

    #[test]
    fn test_context_enforced() {
        let registry = ShortcutRegistry::new();
        let dispatcher = ShortcutDispatcher::with_sink(
            registry.clone(),
            KeyConvention::Control,
            Arc::new(MemorySink::new()),
        )
        .with_context_enforcement(true);
        registry.register(
            ShortcutBinding::new(KeyChord::ctrl("r"), "Refresh", || Ok(()))
                .with_context(ShortcutContext::Analysis),
        );
        registry.register(
            ShortcutBinding::new(KeyChord::key_only("?"), "Help", || Ok(()))
                .with_context(ShortcutContext::Global),
        );

        let mut press = KeyPress::new("r", KeyboardModifiers::CTRL);
        assert_eq!(dispatcher.dispatch(&mut press), DispatchOutcome::NoMatch);
        assert!(dispatcher.dispatch(&mut KeyPress::new("?", KeyboardModifiers::NONE)).is_handled());

        dispatcher.set_active_context(Some(ShortcutContext::Analysis));
        assert!(dispatcher.dispatch(&mut press).is_handled());
        assert_eq!(dispatcher.active_context(), Some(ShortcutContext::Analysis));
    }

    #[test]
    fn test_action_may_mutate_registry() {
        let fx = fixture(KeyConvention::Control);
        let registry = fx.registry.clone();
        fx.registry.register(ShortcutBinding::new(KeyChord::key_only("x"), "Self-removing", move || {
            registry.unregister(&KeyChord::key_only("x"));
            Ok(())
        }));

        assert!(fx.dispatcher.dispatch(&mut KeyPress::new("x", KeyboardModifiers::NONE)).is_handled());
        assert!(fx.registry.is_empty());
    }

    #[test]
    fn test_overlay_state_shared() {
        let overlays = OverlayState::new();
        let other = overlays.clone();
        overlays.set_help_visible(true);
        other.set_quick_search_visible(true);
        assert!(other.is_help_visible());
        assert!(overlays.is_quick_search_visible());
        other.dismiss_all();
        assert!(!overlays.is_help_visible());
        assert!(!overlays.is_quick_search_visible());
    }
}
