use std::collections::HashSet;

use super::types::{Key, KeyAction, KeyEvent, KeyMods};

/// Keyboard state for the main window.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current modifier state, taken from the latest key event.
    pub mods: KeyMods,

    keys_down: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a key event.
    ///
    /// `Held` repeats keep the key down; a repeat without a prior press (focus
    /// gained while holding) also counts as down.
    pub fn apply(&mut self, ev: &KeyEvent) {
        self.mods = ev.mods;

        match ev.action {
            KeyAction::Press | KeyAction::Held => {
                self.keys_down.insert(ev.key);
            }
            KeyAction::Release => {
                self.keys_down.remove(&ev.key);
            }
        }
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn keys_down(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys_down.iter().copied()
    }

    /// Forgets every held key. Called on focus loss to avoid stuck keys.
    pub fn clear(&mut self) {
        self.keys_down.clear();
        self.mods = KeyMods::NONE;
    }
}
