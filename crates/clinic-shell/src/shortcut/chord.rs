//! Key chords: a key label plus per-modifier requirements.
//!
//! A [`KeyChord`] is the identity of a shortcut binding. Each modifier of the
//! chord is a tri-state requirement: required held, required released, or
//! unconstrained. Key labels are compared case-insensitively, so a binding
//! on `"d"` matches a `"D"` key press produced with Shift held.
//!
//! ```
//! use clinic_shell::shortcut::{KeyChord, KeyConvention};
//!
//! let chord: KeyChord = "Ctrl+Shift+I".parse().unwrap();
//! assert_eq!(chord.display(KeyConvention::Control), "Ctrl + Shift + I");
//! assert_eq!(chord.display(KeyConvention::Command), "⌘ + ⇧ + I");
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::event::KeyboardModifiers;

// =============================================================================
// Key Convention
// =============================================================================

/// Which physical key acts as the platform's primary shortcut modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyConvention {
    /// The Command key is primary (macOS, iOS).
    Command,
    /// The Control key is primary (Windows, Linux).
    Control,
}

impl KeyConvention {
    /// The convention of the platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Self::Command
        } else {
            Self::Control
        }
    }

    /// State of the primary modifier in `modifiers` under this convention.
    pub fn primary_held(self, modifiers: KeyboardModifiers) -> bool {
        match self {
            Self::Command => modifiers.meta,
            Self::Control => modifiers.ctrl,
        }
    }
}

impl Default for KeyConvention {
    fn default() -> Self {
        Self::current()
    }
}

// =============================================================================
// Modifier Requirements
// =============================================================================

/// Per-modifier constraints of a binding.
///
/// `Some(true)` means the modifier must be held, `Some(false)` that it must
/// be released, and `None` that its state is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModifierRequirements {
    /// Primary modifier requirement (see [`KeyConvention`]).
    pub ctrl: Option<bool>,
    /// Meta / Command key requirement.
    pub meta: Option<bool>,
    /// Shift key requirement.
    pub shift: Option<bool>,
    /// Alt / Option key requirement.
    pub alt: Option<bool>,
}

impl ModifierRequirements {
    /// No modifier is constrained.
    pub const ANY: Self = Self {
        ctrl: None,
        meta: None,
        shift: None,
        alt: None,
    };

    /// Only Shift is constrained (held).
    pub const SHIFT: Self = Self {
        shift: Some(true),
        ..Self::ANY
    };

    /// Only the primary modifier is constrained (held).
    pub const CTRL: Self = Self {
        ctrl: Some(true),
        ..Self::ANY
    };

    /// Only Alt is constrained (held).
    pub const ALT: Self = Self {
        alt: Some(true),
        ..Self::ANY
    };

    /// Primary modifier and Shift are constrained (held).
    pub const CTRL_SHIFT: Self = Self {
        ctrl: Some(true),
        shift: Some(true),
        ..Self::ANY
    };

    /// Set the primary modifier requirement.
    pub fn with_ctrl(mut self, held: bool) -> Self {
        self.ctrl = Some(held);
        self
    }

    /// Set the meta requirement.
    pub fn with_meta(mut self, held: bool) -> Self {
        self.meta = Some(held);
        self
    }

    /// Set the shift requirement.
    pub fn with_shift(mut self, held: bool) -> Self {
        self.shift = Some(held);
        self
    }

    /// Set the alt requirement.
    pub fn with_alt(mut self, held: bool) -> Self {
        self.alt = Some(held);
        self
    }

    /// Returns `true` if no modifier is constrained.
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::ANY
    }

    /// Check the actual modifier state against every constrained modifier.
    ///
    /// Under [`KeyConvention::Command`] the `ctrl` requirement is tested
    /// against the meta key, which is the primary modifier there.
    pub fn satisfied_by(&self, actual: KeyboardModifiers, convention: KeyConvention) -> bool {
        fn check(required: Option<bool>, actual: bool) -> bool {
            required.is_none_or(|held| held == actual)
        }

        check(self.ctrl, convention.primary_held(actual))
            && check(self.meta, actual.meta)
            && check(self.shift, actual.shift)
            && check(self.alt, actual.alt)
    }
}

// =============================================================================
// Key Chord
// =============================================================================

/// A key label plus modifier requirements.
///
/// Equality and hashing ignore the case of the key label, matching the way
/// key presses are compared during dispatch.
#[derive(Debug, Clone)]
pub struct KeyChord {
    key: String,
    normalized: String,
    modifiers: ModifierRequirements,
}

impl KeyChord {
    /// Create a chord from a key label and modifier requirements.
    pub fn new(key: impl Into<String>, modifiers: ModifierRequirements) -> Self {
        let key = key.into();
        let normalized = key.to_lowercase();
        Self {
            key,
            normalized,
            modifiers,
        }
    }

    /// A key with no modifier constraints.
    pub fn key_only(key: impl Into<String>) -> Self {
        Self::new(key, ModifierRequirements::ANY)
    }

    /// Shift+key.
    pub fn shift(key: impl Into<String>) -> Self {
        Self::new(key, ModifierRequirements::SHIFT)
    }

    /// Primary+key (Ctrl, or Command on Command-convention platforms).
    pub fn ctrl(key: impl Into<String>) -> Self {
        Self::new(key, ModifierRequirements::CTRL)
    }

    /// Alt+key.
    pub fn alt(key: impl Into<String>) -> Self {
        Self::new(key, ModifierRequirements::ALT)
    }

    /// Primary+Shift+key.
    pub fn ctrl_shift(key: impl Into<String>) -> Self {
        Self::new(key, ModifierRequirements::CTRL_SHIFT)
    }

    /// The key label as written.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The lowercased key label used for comparisons.
    pub fn normalized_key(&self) -> &str {
        &self.normalized
    }

    /// The modifier requirements.
    pub fn modifiers(&self) -> ModifierRequirements {
        self.modifiers
    }

    /// Check whether a key press matches this chord.
    pub fn matches(&self, key: &str, modifiers: KeyboardModifiers, convention: KeyConvention) -> bool {
        self.matches_normalized(&key.to_lowercase(), modifiers, convention)
    }

    /// Like [`matches`](Self::matches), for a key label already lowercased.
    pub fn matches_normalized(
        &self,
        normalized_key: &str,
        modifiers: KeyboardModifiers,
        convention: KeyConvention,
    ) -> bool {
        self.normalized == normalized_key && self.modifiers.satisfied_by(modifiers, convention)
    }

    /// Render the chord for a help surface.
    ///
    /// Only modifiers required to be held are shown, in the order primary,
    /// meta, shift, alt. The key label is uppercased except for `?`.
    pub fn display(&self, convention: KeyConvention) -> String {
        let (ctrl, meta, shift, alt) = match convention {
            KeyConvention::Command => ("⌘", "⌘", "⇧", "⌥"),
            KeyConvention::Control => ("Ctrl", "Meta", "Shift", "Alt"),
        };

        let mut parts = Vec::new();
        if self.modifiers.ctrl == Some(true) {
            parts.push(ctrl);
        }
        if self.modifiers.meta == Some(true) {
            parts.push(meta);
        }
        if self.modifiers.shift == Some(true) {
            parts.push(shift);
        }
        if self.modifiers.alt == Some(true) {
            parts.push(alt);
        }

        let key = if self.key == "?" {
            self.key.clone()
        } else {
            self.key.to_uppercase()
        };

        if parts.is_empty() {
            key
        } else {
            format!("{} + {}", parts.join(" + "), key)
        }
    }
}

impl PartialEq for KeyChord {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized && self.modifiers == other.modifiers
    }
}

impl Eq for KeyChord {}

impl Hash for KeyChord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
        self.modifiers.hash(state);
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display(KeyConvention::current()))
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Error parsing a key chord from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChordParseError {
    /// The string is empty.
    #[error("empty key chord")]
    Empty,
    /// Only modifiers were given.
    #[error("no key specified (only modifiers)")]
    NoKey,
    /// More than one non-modifier key was given.
    #[error("more than one key in chord: '{first}' and '{second}'")]
    MultipleKeys {
        /// The first key found.
        first: String,
        /// The second key found.
        second: String,
    },
}

impl FromStr for KeyChord {
    type Err = ChordParseError;

    /// Parse a chord such as `"Ctrl+Shift+K"`, `"Shift+D"`, `"?"` or `"Escape"`.
    ///
    /// Named modifiers become required-held; modifiers not named stay
    /// unconstrained. `Ctrl`, `Control`, `Mod` and `Primary` name the primary
    /// modifier; `Meta`, `Cmd`, `Command`, `Super` and `Win` name the meta key.
    /// A lone `+` parses as the plus key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ChordParseError::Empty);
        }
        if s == "+" {
            return Ok(Self::key_only("+"));
        }

        let mut modifiers = ModifierRequirements::ANY;
        let mut key: Option<&str> = None;

        for part in s.split('+') {
            let part = part.trim();
            match part.to_lowercase().as_str() {
                "ctrl" | "control" | "mod" | "primary" => modifiers.ctrl = Some(true),
                "meta" | "cmd" | "command" | "super" | "win" => modifiers.meta = Some(true),
                "shift" => modifiers.shift = Some(true),
                "alt" | "option" | "opt" => modifiers.alt = Some(true),
                "" => return Err(ChordParseError::NoKey),
                _ => {
                    if let Some(first) = key {
                        return Err(ChordParseError::MultipleKeys {
                            first: first.to_string(),
                            second: part.to_string(),
                        });
                    }
                    key = Some(part);
                }
            }
        }

        match key {
            Some(k) => Ok(Self::new(k, modifiers)),
            None => Err(ChordParseError::NoKey),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconstrained_chord_ignores_modifiers() {
        let chord = KeyChord::key_only("?");
        for mods in [
            KeyboardModifiers::NONE,
            KeyboardModifiers::SHIFT,
            KeyboardModifiers::CTRL,
            KeyboardModifiers {
                ctrl: true,
                meta: true,
                shift: true,
                alt: true,
            },
        ] {
            assert!(chord.matches("?", mods, KeyConvention::Control));
        }
    }

    #[test]
    fn test_constrained_modifier_must_equal() {
        let held = KeyChord::shift("d");
        assert!(held.matches("D", KeyboardModifiers::SHIFT, KeyConvention::Control));
        assert!(!held.matches("d", KeyboardModifiers::NONE, KeyConvention::Control));

        let released = KeyChord::new("d", ModifierRequirements::ANY.with_shift(false));
        assert!(released.matches("d", KeyboardModifiers::NONE, KeyConvention::Control));
        assert!(!released.matches("d", KeyboardModifiers::SHIFT, KeyConvention::Control));
        // Alt is unconstrained.
        assert!(released.matches("d", KeyboardModifiers::ALT, KeyConvention::Control));
    }

    #[test]
    fn test_key_mismatch() {
        let chord = KeyChord::ctrl("k");
        assert!(!chord.matches("j", KeyboardModifiers::CTRL, KeyConvention::Control));
    }

    #[test]
    fn test_command_convention_remaps_ctrl() {
        let chord = KeyChord::ctrl("u");
        let meta_only = KeyboardModifiers::META;
        let ctrl_only = KeyboardModifiers::CTRL;

        assert!(chord.matches("u", meta_only, KeyConvention::Command));
        assert!(!chord.matches("u", ctrl_only, KeyConvention::Command));
        assert!(chord.matches("u", ctrl_only, KeyConvention::Control));
        assert!(!chord.matches("u", meta_only, KeyConvention::Control));
    }

    #[test]
    fn test_identity_ignores_key_case() {
        assert_eq!(KeyChord::shift("D"), KeyChord::shift("d"));
        assert_ne!(KeyChord::shift("d"), KeyChord::key_only("d"));
        assert_ne!(
            KeyChord::new("d", ModifierRequirements::ANY.with_shift(false)),
            KeyChord::key_only("d")
        );
    }

    #[test]
    fn test_display_control_convention() {
        assert_eq!(KeyChord::ctrl_shift("k").display(KeyConvention::Control), "Ctrl + Shift + K");
        assert_eq!(KeyChord::shift("d").display(KeyConvention::Control), "Shift + D");
        assert_eq!(KeyChord::alt("1").display(KeyConvention::Control), "Alt + 1");
        assert_eq!(
            KeyChord::new("x", ModifierRequirements::ANY.with_meta(true)).display(KeyConvention::Control),
            "Meta + X"
        );
    }

    #[test]
    fn test_display_command_convention() {
        assert_eq!(KeyChord::ctrl("d").display(KeyConvention::Command), "⌘ + D");
        assert_eq!(KeyChord::ctrl_shift("i").display(KeyConvention::Command), "⌘ + ⇧ + I");
        assert_eq!(KeyChord::alt("2").display(KeyConvention::Command), "⌥ + 2");
    }

    #[test]
    fn test_display_bare_keys() {
        assert_eq!(KeyChord::key_only("?").display(KeyConvention::Control), "?");
        assert_eq!(KeyChord::key_only("Escape").display(KeyConvention::Control), "ESCAPE");
        // Released requirements are not shown.
        let chord = KeyChord::new("k", ModifierRequirements::ANY.with_ctrl(false));
        assert_eq!(chord.display(KeyConvention::Control), "K");
    }

    #[test]
    fn test_parse() {
        let chord: KeyChord = "Ctrl+Shift+K".parse().unwrap();
        assert_eq!(chord, KeyChord::ctrl_shift("k"));
        assert_eq!(chord.key(), "K");

        let chord: KeyChord = "cmd + d".parse().unwrap();
        assert_eq!(chord.modifiers().meta, Some(true));
        assert_eq!(chord.modifiers().ctrl, None);

        let chord: KeyChord = "Escape".parse().unwrap();
        assert!(chord.modifiers().is_unconstrained());

        assert_eq!("+".parse::<KeyChord>().unwrap().key(), "+");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<KeyChord>(), Err(ChordParseError::Empty));
        assert_eq!("Ctrl+Shift".parse::<KeyChord>(), Err(ChordParseError::NoKey));
        assert_eq!("Ctrl+".parse::<KeyChord>(), Err(ChordParseError::NoKey));
        assert!(matches!(
            "a+b".parse::<KeyChord>(),
            Err(ChordParseError::MultipleKeys { .. })
        ));
    }
}
