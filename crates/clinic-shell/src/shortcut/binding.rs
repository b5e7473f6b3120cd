//! Shortcut bindings: a chord, its metadata, and the action it triggers.

use std::fmt;
use std::sync::Arc;

use clinic_shell_core::{HandlerResult, invoke_guarded};
use serde::{Deserialize, Serialize};

use super::chord::KeyChord;

/// Action run when a binding fires.
pub type ShortcutAction = Arc<dyn Fn() -> HandlerResult + Send + Sync>;

/// Grouping used by the help surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutCategory {
    /// Moving between top-level views.
    Navigation,
    /// Patient selection.
    Patient,
    /// Analysis view actions.
    Analysis,
    /// Everything else.
    General,
}

impl ShortcutCategory {
    /// All categories in help display order.
    pub const ALL: [Self; 4] = [Self::Navigation, Self::Patient, Self::Analysis, Self::General];

    /// Human-readable heading.
    pub fn label(self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::Patient => "Patient",
            Self::Analysis => "Analysis",
            Self::General => "General",
        }
    }
}

impl fmt::Display for ShortcutCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// UI region a binding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShortcutContext {
    /// Available everywhere.
    Global,
    /// The patient list.
    PatientList,
    /// The analysis view.
    Analysis,
    /// The transcript view.
    Transcript,
}

impl ShortcutContext {
    /// Stable name of the context.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::PatientList => "patient-list",
            Self::Analysis => "analysis",
            Self::Transcript => "transcript",
        }
    }
}

impl fmt::Display for ShortcutContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyboard shortcut: chord, description and action.
///
/// ```
/// use clinic_shell::shortcut::{KeyChord, ShortcutBinding, ShortcutCategory};
///
/// let binding = ShortcutBinding::new(KeyChord::ctrl("s"), "Save analysis", || Ok(()))
///     .with_category(ShortcutCategory::Analysis)
///     .with_suppress_default(true);
/// assert!(binding.suppresses_default());
/// ```
#[derive(Clone)]
pub struct ShortcutBinding {
    chord: KeyChord,
    description: String,
    category: ShortcutCategory,
    context: Option<ShortcutContext>,
    suppress_default: bool,
    action: ShortcutAction,
}

impl ShortcutBinding {
    /// Create a binding in the general category, without context, that does
    /// not suppress the platform default.
    pub fn new<F>(chord: KeyChord, description: impl Into<String>, action: F) -> Self
    where
        F: Fn() -> HandlerResult + Send + Sync + 'static,
    {
        Self::from_action(chord, description, Arc::new(action))
    }

    /// Create a binding from an already shared action.
    pub fn from_action(chord: KeyChord, description: impl Into<String>, action: ShortcutAction) -> Self {
        Self {
            chord,
            description: description.into(),
            category: ShortcutCategory::General,
            context: None,
            suppress_default: false,
            action,
        }
    }

    /// Set the help category.
    pub fn with_category(mut self, category: ShortcutCategory) -> Self {
        self.category = category;
        self
    }

    /// Set the UI context.
    pub fn with_context(mut self, context: ShortcutContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Set whether a match cancels the platform default.
    pub fn with_suppress_default(mut self, suppress: bool) -> Self {
        self.suppress_default = suppress;
        self
    }

    /// The binding's identity.
    pub fn chord(&self) -> &KeyChord {
        &self.chord
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Help category.
    pub fn category(&self) -> ShortcutCategory {
        self.category
    }

    /// UI context, if any.
    pub fn context(&self) -> Option<ShortcutContext> {
        self.context
    }

    /// Whether a match cancels the platform default.
    pub fn suppresses_default(&self) -> bool {
        self.suppress_default
    }

    /// Run the action, converting a panic into an error.
    pub fn invoke(&self) -> HandlerResult {
        invoke_guarded(|| (self.action)())
    }
}

impl fmt::Debug for ShortcutBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutBinding")
            .field("chord", &self.chord)
            .field("description", &self.description)
            .field("category", &self.category)
            .field("context", &self.context)
            .field("suppress_default", &self.suppress_default)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_shell_core::HandlerError;

    #[test]
    fn test_defaults() {
        let binding = ShortcutBinding::new(KeyChord::key_only("x"), "Example", || Ok(()));
        assert_eq!(binding.category(), ShortcutCategory::General);
        assert_eq!(binding.context(), None);
        assert!(!binding.suppresses_default());
        assert_eq!(binding.description(), "Example");
    }

    #[test]
    fn test_invoke_catches_panic() {
        let binding = ShortcutBinding::new(KeyChord::key_only("x"), "Boom", || panic!("broken"));
        let err = binding.invoke().unwrap_err();
        assert!(err.is_panic());
    }

    #[test]
    fn test_invoke_returns_error() {
        let binding =
            ShortcutBinding::new(KeyChord::key_only("x"), "Fails", || Err(HandlerError::msg("no route")));
        assert_eq!(binding.invoke().unwrap_err().to_string(), "no route");
    }

    #[test]
    fn test_category_order() {
        let mut cats = vec![
            ShortcutCategory::General,
            ShortcutCategory::Analysis,
            ShortcutCategory::Navigation,
            ShortcutCategory::Patient,
        ];
        cats.sort();
        assert_eq!(cats, ShortcutCategory::ALL);
    }

    #[test]
    fn test_context_names() {
        assert_eq!(ShortcutContext::PatientList.as_str(), "patient-list");
        assert_eq!(ShortcutContext::Global.to_string(), "global");
    }
}
