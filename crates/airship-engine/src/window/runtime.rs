use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use airship_core::input::KeyMods;
use airship_core::time::DEFAULT_MAX_DT;

use crate::core::{AppControl, Application, FrameCtx, Graphics, StartCtx, WindowResized};
use crate::device::{Gpu, GpuInit};
use crate::render::Renderer;

use super::headless;
use super::keymap::{map_modifiers, translate_key};
use super::services::Services;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Initial window size in logical pixels.
    pub width: u32,
    pub height: u32,
    pub visible: bool,
    /// Upper clamp for the frame delta, in seconds.
    pub max_frame_dt: f32,
    /// `name=value` convar overrides applied after the runtime convars are registered.
    pub convar_overrides: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "airship".to_string(),
            width: 1280,
            height: 720,
            visible: true,
            max_frame_dt: DEFAULT_MAX_DT,
            convar_overrides: Vec::new(),
        }
    }
}

/// Runtime context passed to the application.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.commands.push(Command::SetTitle(title.into()));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    pub fn exit_requested(&self) -> bool {
        self.commands.iter().any(|c| matches!(c, Command::Exit))
    }

    pub(super) fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

pub(super) enum Command {
    SetTitle(String),
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Windowed mode: one main window with a GPU surface and renderer.
    ///
    /// Returns when the window is closed or the app requests exit. An error
    /// from `Application::on_start` is returned after the loop shuts down.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: Application + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Server mode: no window and no GPU, only events, convars and the game loop.
    pub fn run_headless<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: Application,
    {
        headless::run(config, app)
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: Application + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    services: Services,
    renderer: Renderer,
    mods: KeyMods,

    window: Option<WindowEntry>,
    exit_requested: bool,
    error: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: Application + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        let services = Services::new(&config);
        Self {
            config,
            gpu_init,
            app,
            services,
            renderer: Renderer::new(),
            mods: KeyMods::NONE,
            window: None,
            exit_requested: false,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (width, height) = self.services.window_size();
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(width as f64, height as f64))
            .with_visible(self.config.visible);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntry::try_new(window, |w| pollster::block_on(Gpu::new(w, gpu_init)))
            .context("GPU initialization failed for window")?;

        let size = entry.with_gpu(|gpu| gpu.size());
        self.renderer.resize(size.width, size.height);
        self.services.set_window_size(size.width, size.height);

        self.window = Some(entry);
        Ok(())
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) {
        let mut runtime_ctx = RuntimeCtx::default();

        let Self {
            app,
            services,
            renderer,
            window,
            ..
        } = self;
        let Some(entry) = window.as_mut() else {
            return;
        };

        let result = entry.with_mut(|fields| {
            let mut ctx = StartCtx {
                events: &services.events,
                convars: &mut services.convars,
                runtime: &mut runtime_ctx,
                graphics: Some(Graphics::new(fields.window, fields.gpu, renderer)),
            };
            app.on_start(&mut ctx)
        });
        services.reset_clock();

        if let Err(e) = result {
            self.fail(event_loop, e.context("application start failed"));
            return;
        }

        self.apply_commands(event_loop, runtime_ctx);
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let Some(entry) = self.window.as_mut() else {
            return;
        };

        entry.with_gpu_mut(|gpu| gpu.resize(new_size));
        self.renderer.resize(new_size.width, new_size.height);
        self.services.set_window_size(new_size.width, new_size.height);
        self.services.events.publish(WindowResized {
            width: new_size.width,
            height: new_size.height,
        });
        self.app.on_resize(new_size.width, new_size.height);

        entry.with_window(|w| w.request_redraw());
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let time = self.services.begin_frame();
        let mut runtime_ctx = RuntimeCtx::default();

        let Self {
            app,
            services,
            renderer,
            window,
            ..
        } = self;
        let Some(entry) = window.as_mut() else {
            return;
        };

        let control = entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                events: &services.events,
                convars: &mut services.convars,
                input: &services.input,
                time,
                runtime: &mut runtime_ctx,
                graphics: Some(Graphics::new(fields.window, fields.gpu, renderer)),
            };
            app.on_game_loop(&mut ctx)
        });

        if control == AppControl::Exit {
            runtime_ctx.exit();
        }

        self.apply_commands(event_loop, runtime_ctx);
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop, ctx: RuntimeCtx) {
        for cmd in ctx.into_commands() {
            match cmd {
                Command::SetTitle(title) => {
                    if let Some(entry) = &self.window {
                        entry.with_window(|w| w.set_title(&title));
                    }
                }
                Command::Exit => self.exit_requested = true,
            }
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: Application + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        self.start(event_loop);

        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // The game loop runs continuously.
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = &self.window else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("main window closed");
                self.window = None;
                self.exit_requested = true;
            }

            WindowEvent::Resized(new_size) => self.resize(new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                self.resize(new_size);
            }

            WindowEvent::Focused(false) => self.services.input.clear(),

            WindowEvent::ModifiersChanged(m) => self.mods = map_modifiers(m.state()),

            WindowEvent::KeyboardInput { event, .. } => {
                let ev = translate_key(&event, self.mods);
                self.services.input.apply(&ev);
                self.services.events.publish(ev);

                if self.app.on_key(&ev) == AppControl::Exit {
                    self.exit_requested = true;
                }
            }

            WindowEvent::RedrawRequested => self.frame(event_loop),

            _ => {}
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}
