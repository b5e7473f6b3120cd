//! Key-press events delivered by the host platform.

/// Keyboard modifiers held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Control key is held.
    pub ctrl: bool,
    /// The Meta key is held (Command on macOS, Windows key elsewhere).
    pub meta: bool,
    /// The Shift key is held.
    pub shift: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        ctrl: false,
        meta: false,
        shift: false,
        alt: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Meta modifier only.
    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Alt modifier only.
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    /// Control + Shift modifiers.
    pub const CTRL_SHIFT: Self = Self {
        ctrl: true,
        shift: true,
        ..Self::NONE
    };

    /// Meta + Shift modifiers.
    pub const META_SHIFT: Self = Self {
        meta: true,
        shift: true,
        ..Self::NONE
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.ctrl || self.meta || self.shift || self.alt
    }

    /// Check if no modifiers are pressed.
    pub fn none(&self) -> bool {
        !self.any()
    }
}

/// The element that had focus when a key was pressed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputTarget {
    /// The page itself, or a non-input element.
    #[default]
    Document,
    /// A single-line text field.
    TextField,
    /// A multi-line text area.
    TextArea,
    /// A content-editable region.
    Editable,
    /// Any other focusable element, named by the host.
    Other(String),
}

impl InputTarget {
    /// Returns `true` for surfaces where key presses produce typed text.
    pub fn is_text_entry(&self) -> bool {
        matches!(self, Self::TextField | Self::TextArea | Self::Editable)
    }
}

/// Labels of keys that only ever act as modifiers.
const MODIFIER_KEYS: [&str; 6] = ["shift", "control", "alt", "meta", "os", "altgraph"];

/// A single physical key press.
///
/// The host fills in the key label, modifier state and focus target, then
/// hands the event to the dispatcher. The dispatcher may mark the event's
/// default handling as prevented; the host must honour that flag.
#[derive(Debug, Clone)]
pub struct KeyPress {
    /// The key label reported by the platform ("d", "D", "Escape", "?").
    pub key: String,
    /// Modifiers held during the press.
    pub modifiers: KeyboardModifiers,
    /// Where focus was.
    pub target: InputTarget,
    default_prevented: bool,
}

impl KeyPress {
    /// Create a key press on the document with the given modifiers.
    pub fn new(key: impl Into<String>, modifiers: KeyboardModifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            target: InputTarget::Document,
            default_prevented: false,
        }
    }

    /// Set the focus target.
    pub fn with_target(mut self, target: InputTarget) -> Self {
        self.target = target;
        self
    }

    /// Cancel the platform's default handling of this key press.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether default handling was cancelled.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Whether the pressed key is itself a modifier (Shift, Control, ...).
    pub fn is_modifier_key(&self) -> bool {
        let key = self.key.to_lowercase();
        MODIFIER_KEYS.contains(&key.as_str())
    }
}
