//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and main window, wires them to the GPU layer,
//! and drives the `Application` callbacks. `Runtime::run_headless` drives the
//! same callbacks without a window.

mod headless;
mod keymap;
mod runtime;
mod services;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
pub use services::{MAX_FRAME_DT, WINDOW_HEIGHT, WINDOW_WIDTH};
