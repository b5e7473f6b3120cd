//! Read-only listing of active bindings for a help surface.

use std::sync::Arc;

use serde::Serialize;

use super::binding::{ShortcutBinding, ShortcutCategory};
use super::chord::KeyConvention;

/// One row of the help surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpEntry {
    /// Rendered key combination, e.g. "⌘ + D" or "Ctrl + Shift + K".
    pub keys: String,
    /// What the shortcut does.
    pub description: String,
    /// Help category.
    pub category: ShortcutCategory,
}

/// Render `bindings` for display, sorted by category then by keys.
pub fn help_entries(bindings: &[Arc<ShortcutBinding>], convention: KeyConvention) -> Vec<HelpEntry> {
    let mut entries: Vec<HelpEntry> = bindings
        .iter()
        .map(|binding| HelpEntry {
            keys: binding.chord().display(convention),
            description: binding.description().to_string(),
            category: binding.category(),
        })
        .collect();
    entries.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.keys.cmp(&b.keys)));
    entries
}

/// Render `bindings` grouped by category, in category order.
///
/// Categories without bindings are omitted.
pub fn help_by_category(
    bindings: &[Arc<ShortcutBinding>],
    convention: KeyConvention,
) -> Vec<(ShortcutCategory, Vec<HelpEntry>)> {
    let entries = help_entries(bindings, convention);
    ShortcutCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let group: Vec<HelpEntry> = entries
                .iter()
                .filter(|e| e.category == category)
                .cloned()
                .collect();
            (!group.is_empty()).then_some((category, group))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::chord::KeyChord;

    fn binding(chord: KeyChord, description: &str, category: ShortcutCategory) -> Arc<ShortcutBinding> {
        Arc::new(ShortcutBinding::new(chord, description, || Ok(())).with_category(category))
    }

    fn sample() -> Vec<Arc<ShortcutBinding>> {
        vec![
            binding(KeyChord::key_only("?"), "Help", ShortcutCategory::General),
            binding(KeyChord::ctrl("s"), "Save", ShortcutCategory::Analysis),
            binding(KeyChord::shift("p"), "Patients", ShortcutCategory::Navigation),
            binding(KeyChord::shift("d"), "Dashboard", ShortcutCategory::Navigation),
        ]
    }

    #[test]
    fn test_sorted_by_category_then_keys() {
        let entries = help_entries(&sample(), KeyConvention::Control);
        let keys: Vec<&str> = entries.iter().map(|e| e.keys.as_str()).collect();
        assert_eq!(keys, vec!["Shift + D", "Shift + P", "Ctrl + S", "?"]);
    }

    #[test]
    fn test_command_symbols() {
        let entries = help_entries(&sample(), KeyConvention::Command);
        assert_eq!(entries[0].keys, "⇧ + D");
        assert_eq!(entries[2].keys, "⌘ + S");
    }

    #[test]
    fn test_grouping_skips_empty_categories() {
        let groups = help_by_category(&sample(), KeyConvention::Control);
        let categories: Vec<ShortcutCategory> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            categories,
            vec![
                ShortcutCategory::Navigation,
                ShortcutCategory::Analysis,
                ShortcutCategory::General
            ]
        );
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn test_empty() {
        assert!(help_entries(&[], KeyConvention::Control).is_empty());
        assert!(help_by_category(&[], KeyConvention::Control).is_empty());
    }
}
