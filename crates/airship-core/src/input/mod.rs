//! Keyboard input vocabulary.
//!
//! Platform-agnostic; the runtime translates window system events into
//! `KeyEvent`s.

mod state;
mod types;

pub use state::InputState;
pub use types::{Key, KeyAction, KeyEvent, KeyMods};
