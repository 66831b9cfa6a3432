//! Frame timing.
//!
//! One `FrameClock` drives the game loop; `tick()` is called once per
//! iteration to obtain the clamped delta.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime, DEFAULT_MAX_DT};
