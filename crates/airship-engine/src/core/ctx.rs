use winit::window::Window;

use airship_core::convar::ConvarRegistry;
use airship_core::event::EventPublisher;
use airship_core::input::InputState;
use airship_core::time::FrameTime;

use crate::device::{Gpu, SurfaceErrorAction};
use crate::render::{Frame, RenderCtx, RenderTarget, Renderer};
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Window, GPU and renderer of a windowed run.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct Graphics<'a, 'w> {
    pub window: &'a Window,
    pub renderer: &'a mut Renderer,
    gpu: &'a mut Gpu<'w>,
}

impl<'a, 'w> Graphics<'a, 'w> {
    pub(crate) fn new(window: &'a Window, gpu: &'a mut Gpu<'w>, renderer: &'a mut Renderer) -> Self {
        Self {
            window,
            renderer,
            gpu,
        }
    }

    /// Device access for creating shaders, pipelines and buffers.
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(self.gpu.device(), self.gpu.queue(), self.gpu.surface_format())
    }

    /// Drawable size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        let size = self.gpu.size();
        (size.width, size.height)
    }

    pub fn gpu(&self) -> &Gpu<'w> {
        self.gpu
    }

    /// Acquires the next frame, lets `draw` record into it, then presents it.
    ///
    /// Surface loss is handled here; `Exit` is returned only when the surface
    /// error is fatal.
    pub fn render<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&mut Frame<'_>),
    {
        let mut gpu_frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let action = self.gpu.handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    log::error!("fatal surface error, stopping");
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        let texture = &gpu_frame.surface_texture.texture;
        let size = (texture.width(), texture.height());

        // Frame borrows the encoder; dropped before submit() takes it.
        {
            let ctx = RenderCtx::new(self.gpu.device(), self.gpu.queue(), self.gpu.surface_format());
            let target = RenderTarget::new(&mut gpu_frame.encoder, &gpu_frame.view, size);
            let mut frame = Frame::new(ctx, target, self.renderer);
            draw(&mut frame);
        }

        self.window.pre_present_notify();
        self.gpu.submit(gpu_frame);

        AppControl::Continue
    }
}

/// Context passed to `Application::on_start`.
pub struct StartCtx<'a, 'w> {
    pub events: &'a EventPublisher,
    pub convars: &'a mut ConvarRegistry,
    pub runtime: &'a mut RuntimeCtx,
    /// `None` in headless (server) runs.
    pub graphics: Option<Graphics<'a, 'w>>,
}

/// Per-iteration context passed to `Application::on_game_loop`.
pub struct FrameCtx<'a, 'w> {
    pub events: &'a EventPublisher,
    pub convars: &'a mut ConvarRegistry,
    pub input: &'a InputState,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
    /// `None` in headless (server) runs.
    pub graphics: Option<Graphics<'a, 'w>>,
}

impl FrameCtx<'_, '_> {
    /// Frame delta in seconds.
    pub fn dt(&self) -> f32 {
        self.time.dt
    }
}
