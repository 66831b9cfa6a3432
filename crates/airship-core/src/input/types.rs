use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Keyboard key identifier.
///
/// The runtime maps platform key codes into these variants. Keys without a
/// variant arrive as `Key::Unknown`; the platform scancode is still carried on
/// the `KeyEvent`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits on the main row
    Num0, Num1, Num2, Num3, Num4,
    Num5, Num6, Num7, Num8, Num9,

    // Control keys
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Modifiers as keys
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,

    Unknown,
}

impl Key {
    /// Letter key for an ASCII letter (either case).
    pub fn from_letter(c: char) -> Option<Key> {
        const LETTERS: [Key; 26] = [
            Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
            Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
            Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
        ];
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let idx = (c.to_ascii_uppercase() as u8 - b'A') as usize;
        Some(LETTERS[idx])
    }

    /// Main-row digit key for `0..=9`.
    pub fn from_digit(d: u32) -> Option<Key> {
        const DIGITS: [Key; 10] = [
            Key::Num0, Key::Num1, Key::Num2, Key::Num3, Key::Num4,
            Key::Num5, Key::Num6, Key::Num7, Key::Num8, Key::Num9,
        ];
        DIGITS.get(d as usize).copied()
    }

    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Key::LeftShift
                | Key::RightShift
                | Key::LeftCtrl
                | Key::RightCtrl
                | Key::LeftAlt
                | Key::RightAlt
        )
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// What happened to a key.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum KeyAction {
    Press,
    Release,
    /// Auto-repeat while the key stays down.
    Held,
}

/// Modifier keys state.
///
/// Stored as booleans rather than bitflags to keep it explicit.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct KeyMods {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub super_key: bool,
}

impl KeyMods {
    pub const NONE: KeyMods = KeyMods { shift: false, ctrl: false, alt: false, super_key: false };
    pub const SHIFT: KeyMods = KeyMods { shift: true, ..KeyMods::NONE };
    pub const CTRL: KeyMods = KeyMods { ctrl: true, ..KeyMods::NONE };
    pub const ALT: KeyMods = KeyMods { alt: true, ..KeyMods::NONE };
    pub const SUPER: KeyMods = KeyMods { super_key: true, ..KeyMods::NONE };

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.super_key
    }

    /// True when every modifier set in `other` is also set here.
    pub fn contains(&self, other: KeyMods) -> bool {
        (*self | other) == *self
    }
}

impl BitOr for KeyMods {
    type Output = KeyMods;

    fn bitor(self, rhs: KeyMods) -> KeyMods {
        KeyMods {
            shift: self.shift || rhs.shift,
            ctrl: self.ctrl || rhs.ctrl,
            alt: self.alt || rhs.alt,
            super_key: self.super_key || rhs.super_key,
        }
    }
}

impl BitOrAssign for KeyMods {
    fn bitor_assign(&mut self, rhs: KeyMods) {
        *self = *self | rhs;
    }
}

/// Keyboard event delivered to the application and published on the event bus.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    /// Stable platform code when available.
    pub scancode: u32,
    pub action: KeyAction,
    pub mods: KeyMods,
}

impl KeyEvent {
    pub fn new(key: Key, action: KeyAction) -> Self {
        Self {
            key,
            scancode: 0,
            action,
            mods: KeyMods::NONE,
        }
    }

    pub fn with_mods(mut self, mods: KeyMods) -> Self {
        self.mods = mods;
        self
    }

    pub fn is_press(&self) -> bool {
        self.action == KeyAction::Press
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_digits_map() {
        assert_eq!(Key::from_letter('a'), Some(Key::A));
        assert_eq!(Key::from_letter('Z'), Some(Key::Z));
        assert_eq!(Key::from_letter('1'), None);
        assert_eq!(Key::from_digit(7), Some(Key::Num7));
        assert_eq!(Key::from_digit(10), None);
    }

    #[test]
    fn mods_combine() {
        let m = KeyMods::SHIFT | KeyMods::CTRL;
        assert!(m.any());
        assert!(m.contains(KeyMods::SHIFT));
        assert!(!m.contains(KeyMods::ALT));
        assert!(!KeyMods::NONE.any());
    }
}
