//! The authoritative list of active shortcut bindings.
//!
//! The registry holds two ordered sequences: the baseline bindings fixed
//! when the shell is built, and the bindings UI regions register while they
//! are mounted. Dispatch scans `baseline ++ dynamic` in order.
//!
//! A dynamic binding whose chord equals a baseline chord overrides it: the
//! baseline entry is hidden while the override exists and comes back when
//! the override is unregistered.
//!
//! # Teardown
//!
//! Regions that come and go should prefer [`ShortcutRegistry::register_scoped`],
//! which returns a [`BindingGuard`] that removes the binding when dropped:
//!
//! ```
//! use clinic_shell::shortcut::{KeyChord, ShortcutBinding, ShortcutRegistry};
//!
//! let registry = ShortcutRegistry::new();
//! {
//!     let _guard = registry.register_scoped(
//!         ShortcutBinding::new(KeyChord::ctrl("r"), "Refresh", || Ok(())),
//!     );
//!     assert!(registry.contains(&KeyChord::ctrl("r")));
//! }
//! assert!(!registry.contains(&KeyChord::ctrl("r")));
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::binding::{ShortcutBinding, ShortcutCategory};
use super::chord::KeyChord;

#[derive(Default)]
struct RegistryState {
    baseline: Vec<Arc<ShortcutBinding>>,
    dynamic: Vec<Arc<ShortcutBinding>>,
}

impl RegistryState {
    fn is_overridden(&self, chord: &KeyChord) -> bool {
        self.dynamic.iter().any(|b| b.chord() == chord)
    }

    fn active(&self) -> impl Iterator<Item = &Arc<ShortcutBinding>> {
        self.baseline
            .iter()
            .filter(move |b| !self.is_overridden(b.chord()))
            .chain(self.dynamic.iter())
    }

    fn insert(&mut self, binding: Arc<ShortcutBinding>) -> Option<Arc<ShortcutBinding>> {
        match self.dynamic.iter_mut().find(|b| b.chord() == binding.chord()) {
            Some(slot) => Some(std::mem::replace(slot, binding)),
            None => {
                self.dynamic.push(binding);
                None
            }
        }
    }
}

/// Shared handle to the shortcut registry.
///
/// Cloning the handle is cheap; every clone sees the same bindings. All
/// mutations are visible to the next [`snapshot`](Self::snapshot).
#[derive(Clone, Default)]
pub struct ShortcutRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl ShortcutRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with a fixed baseline.
    ///
    /// If two baseline bindings share a chord, the later one wins and takes
    /// the earlier one's position.
    pub fn with_baseline(baseline: impl IntoIterator<Item = ShortcutBinding>) -> Self {
        let mut entries: Vec<Arc<ShortcutBinding>> = Vec::new();
        for binding in baseline {
            let binding = Arc::new(binding);
            match entries.iter_mut().find(|b| b.chord() == binding.chord()) {
                Some(slot) => *slot = binding,
                None => entries.push(binding),
            }
        }
        tracing::debug!(
            target: "clinic_shell::shortcut",
            count = entries.len(),
            "shortcut registry created with baseline"
        );
        Self {
            state: Arc::new(RwLock::new(RegistryState {
                baseline: entries,
                dynamic: Vec::new(),
            })),
        }
    }

    /// Register a binding.
    ///
    /// Replaces a registered binding with the same chord in place, otherwise
    /// appends. Returns the replaced binding, if any.
    pub fn register(&self, binding: ShortcutBinding) -> Option<Arc<ShortcutBinding>> {
        self.register_shared(Arc::new(binding))
    }

    fn register_shared(&self, binding: Arc<ShortcutBinding>) -> Option<Arc<ShortcutBinding>> {
        tracing::trace!(
            target: "clinic_shell::shortcut",
            chord = %binding.chord(),
            description = binding.description(),
            "registering shortcut"
        );
        self.state.write().insert(binding)
    }

    /// Register several bindings in order.
    pub fn register_all(&self, bindings: impl IntoIterator<Item = ShortcutBinding>) {
        let mut state = self.state.write();
        for binding in bindings {
            state.insert(Arc::new(binding));
        }
    }

    /// Register a binding that is unregistered when the guard drops.
    pub fn register_scoped(&self, binding: ShortcutBinding) -> BindingGuard {
        let binding = Arc::new(binding);
        self.register_shared(binding.clone());
        BindingGuard {
            registry: Arc::downgrade(&self.state),
            binding: Some(binding),
        }
    }

    /// Register several bindings, each with its own guard.
    pub fn register_all_scoped(
        &self,
        bindings: impl IntoIterator<Item = ShortcutBinding>,
    ) -> Vec<BindingGuard> {
        bindings
            .into_iter()
            .map(|binding| self.register_scoped(binding))
            .collect()
    }

    /// Remove the registered binding with exactly this chord.
    ///
    /// Baseline bindings are never removed. Returns `true` if a binding was
    /// removed; unregistering an absent chord does nothing.
    pub fn unregister(&self, chord: &KeyChord) -> bool {
        let mut state = self.state.write();
        let before = state.dynamic.len();
        state.dynamic.retain(|b| b.chord() != chord);
        let removed = state.dynamic.len() != before;
        if removed {
            tracing::trace!(target: "clinic_shell::shortcut", %chord, "unregistered shortcut");
        }
        removed
    }

    /// Remove every registered binding, keeping the baseline.
    pub fn clear_dynamic(&self) {
        self.state.write().dynamic.clear();
    }

    /// The active bindings in dispatch order.
    pub fn snapshot(&self) -> Vec<Arc<ShortcutBinding>> {
        self.state.read().active().cloned().collect()
    }

    /// Active bindings in one category, in dispatch order.
    pub fn bindings_by_category(&self, category: ShortcutCategory) -> Vec<Arc<ShortcutBinding>> {
        self.state
            .read()
            .active()
            .filter(|b| b.category() == category)
            .cloned()
            .collect()
    }

    /// The active binding for a chord, if any.
    pub fn get(&self, chord: &KeyChord) -> Option<Arc<ShortcutBinding>> {
        self.state.read().active().find(|b| b.chord() == chord).cloned()
    }

    /// Whether a binding with this chord is active.
    pub fn contains(&self, chord: &KeyChord) -> bool {
        self.state.read().active().any(|b| b.chord() == chord)
    }

    /// Number of active bindings.
    pub fn len(&self) -> usize {
        self.state.read().active().count()
    }

    /// Whether no binding is active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of baseline bindings, overridden or not.
    pub fn baseline_len(&self) -> usize {
        self.state.read().baseline.len()
    }

    /// Number of registered (non-baseline) bindings.
    pub fn dynamic_len(&self) -> usize {
        self.state.read().dynamic.len()
    }
}

impl fmt::Debug for ShortcutRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("ShortcutRegistry")
            .field("baseline", &state.baseline.len())
            .field("dynamic", &state.dynamic.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(ShortcutRegistry: Send, Sync, Clone);

/// Unregisters a binding when dropped.
///
/// The binding is removed only if it is still the one registered for its
/// chord; a later registration that replaced it is left alone.
#[must_use = "dropping the guard immediately unregisters the binding"]
pub struct BindingGuard {
    registry: Weak<RwLock<RegistryState>>,
    binding: Option<Arc<ShortcutBinding>>,
}

impl BindingGuard {
    /// The chord this guard owns.
    pub fn chord(&self) -> Option<&KeyChord> {
        self.binding.as_ref().map(|b| b.chord())
    }

    /// Keep the binding registered past the guard's lifetime.
    pub fn detach(mut self) {
        self.binding = None;
    }
}

impl Drop for BindingGuard {
    fn drop(&mut self) {
        let Some(binding) = self.binding.take() else {
            return;
        };
        let Some(state) = self.registry.upgrade() else {
            return;
        };
        state.write().dynamic.retain(|b| !Arc::ptr_eq(b, &binding));
    }
}

impl fmt::Debug for BindingGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingGuard")
            .field("chord", &self.chord())
            .finish()
    }
}
