use anyhow::{Context, Result};

use crate::core::{AppControl, Application, FrameCtx, StartCtx};

use super::runtime::{RuntimeConfig, RuntimeCtx};
use super::services::Services;

pub(super) fn run<A: Application>(config: RuntimeConfig, mut app: A) -> Result<()> {
    let mut services = Services::new(&config);

    let mut runtime_ctx = RuntimeCtx::default();
    {
        let mut ctx = StartCtx {
            events: &services.events,
            convars: &mut services.convars,
            runtime: &mut runtime_ctx,
            graphics: None,
        };
        app.on_start(&mut ctx).context("application start failed")?;
    }
    if runtime_ctx.exit_requested() {
        return Ok(());
    }

    log::info!("headless loop started");
    services.reset_clock();

    loop {
        let time = services.begin_frame();
        let mut runtime_ctx = RuntimeCtx::default();

        let control = {
            let mut ctx = FrameCtx {
                events: &services.events,
                convars: &mut services.convars,
                input: &services.input,
                time,
                runtime: &mut runtime_ctx,
                graphics: None,
            };
            app.on_game_loop(&mut ctx)
        };

        if control == AppControl::Exit || runtime_ctx.exit_requested() {
            break;
        }
    }

    log::info!("headless loop stopped");
    Ok(())
}
