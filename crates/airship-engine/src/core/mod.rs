//! Contracts between the runtime loop and the game.

mod app;
mod ctx;

pub use app::{AppControl, Application, WindowResized};
pub use ctx::{FrameCtx, Graphics, StartCtx};
