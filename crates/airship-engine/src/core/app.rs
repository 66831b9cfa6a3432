use airship_core::input::KeyEvent;

use super::ctx::{FrameCtx, StartCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Published on the event bus after the main window was resized.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WindowResized {
    pub width: u32,
    pub height: u32,
}

/// Application contract driven by `Runtime`.
pub trait Application {
    /// Called once before the first game loop iteration.
    ///
    /// Create render resources and register convars and subscriptions here.
    /// An error aborts the run.
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called once per loop iteration with the clamped frame delta.
    fn on_game_loop(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called for every key press, release and repeat of the main window.
    fn on_key(&mut self, event: &KeyEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called after the main window and renderer viewport were resized.
    fn on_resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }
}

impl<A: Application + ?Sized> Application for &mut A {
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> anyhow::Result<()> {
        (**self).on_start(ctx)
    }

    fn on_game_loop(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        (**self).on_game_loop(ctx)
    }

    fn on_key(&mut self, event: &KeyEvent) -> AppControl {
        (**self).on_key(event)
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        (**self).on_resize(width, height)
    }
}
