//! Airship core crate.
//!
//! GPU-free building blocks shared by the engine runtime and games: the typed
//! event bus, the convar registry, logging setup, frame timing, keyboard
//! input vocabulary and small vector types.

pub mod convar;
pub mod coords;
pub mod event;
pub mod input;
pub mod logging;
pub mod time;
