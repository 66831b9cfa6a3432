use airship_core::convar::{Convar, ConvarRegistry};
use airship_core::event::EventPublisher;
use airship_core::input::InputState;
use airship_core::time::{FrameClock, FrameTime};

use super::runtime::RuntimeConfig;

pub const WINDOW_WIDTH: &str = "window_width";
pub const WINDOW_HEIGHT: &str = "window_height";
pub const MAX_FRAME_DT: &str = "max_frame_dt";

/// State shared by the windowed and headless loops.
pub(crate) struct Services {
    pub events: EventPublisher,
    pub convars: ConvarRegistry,
    pub input: InputState,
    clock: FrameClock,
    applied_max_dt: f32,

    window_width: Option<Convar<i32>>,
    window_height: Option<Convar<i32>>,
    max_frame_dt: Option<Convar<f32>>,
}

impl Services {
    /// Registers the runtime convars, then applies the config overrides.
    pub fn new(config: &RuntimeConfig) -> Self {
        let mut convars = ConvarRegistry::new();
        let window_width = convars.register_key(WINDOW_WIDTH, clamp_dim(config.width));
        let window_height = convars.register_key(WINDOW_HEIGHT, clamp_dim(config.height));
        let max_frame_dt = convars.register_key(MAX_FRAME_DT, config.max_frame_dt);

        let rejected = convars.apply_overrides(&config.convar_overrides);
        if !rejected.is_empty() {
            log::warn!("{} convar override(s) rejected", rejected.len());
        }

        let mut clock = FrameClock::new();
        let applied_max_dt = config.max_frame_dt;
        clock.set_max_dt(applied_max_dt);

        Self {
            events: EventPublisher::new(),
            convars,
            input: InputState::new(),
            clock,
            applied_max_dt,
            window_width,
            window_height,
            max_frame_dt,
        }
    }

    /// Window size requested through the convars, in logical pixels.
    pub fn window_size(&self) -> (u32, u32) {
        let read = |cv: &Option<Convar<i32>>, fallback: u32| {
            cv.as_ref()
                .map(|c| c.get())
                .filter(|v| *v > 0)
                .map_or(fallback, |v| v as u32)
        };
        (read(&self.window_width, 1), read(&self.window_height, 1))
    }

    pub fn set_window_size(&self, width: u32, height: u32) {
        if let Some(cv) = &self.window_width {
            cv.set(clamp_dim(width));
        }
        if let Some(cv) = &self.window_height {
            cv.set(clamp_dim(height));
        }
    }

    /// Ticks the clock and dispatches events queued since the previous frame.
    pub fn begin_frame(&mut self) -> FrameTime {
        // Re-applied only on change so an invalid value warns once.
        if let Some(cv) = &self.max_frame_dt {
            let max = cv.get();
            if max != self.applied_max_dt {
                self.applied_max_dt = max;
                self.clock.set_max_dt(max);
            }
        }

        let time = self.clock.tick();
        self.events.process();
        time
    }

    /// Restarts frame timing so the first frame after startup is not huge.
    pub fn reset_clock(&mut self) {
        self.clock.reset();
    }
}

fn clamp_dim(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_convars_are_registered() {
        let services = Services::new(&RuntimeConfig::default());
        assert!(services.convars.contains(WINDOW_WIDTH));
        assert!(services.convars.contains(WINDOW_HEIGHT));
        assert!(services.convars.contains(MAX_FRAME_DT));
        assert_eq!(services.window_size(), (1280, 720));
    }

    #[test]
    fn overrides_apply_after_registration() {
        let config = RuntimeConfig {
            convar_overrides: vec!["window_width=640".into(), "bogus=1".into()],
            ..RuntimeConfig::default()
        };
        let services = Services::new(&config);
        assert_eq!(services.window_size(), (640, 720));
    }

    #[test]
    fn resize_updates_convars() {
        let services = Services::new(&RuntimeConfig::default());
        services.set_window_size(300, 200);
        assert_eq!(services.convars.value_text(WINDOW_WIDTH).as_deref(), Some("300"));
        assert_eq!(services.convars.value_text(WINDOW_HEIGHT).as_deref(), Some("200"));
    }

    #[test]
    fn max_frame_dt_convar_feeds_clock() {
        let mut services = Services::new(&RuntimeConfig::default());
        services.convars.set_from_str(MAX_FRAME_DT, "0.02").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(30));
        let t = services.begin_frame();
        assert!(t.dt <= 0.02 + f32::EPSILON);
    }

    #[test]
    fn huge_max_frame_dt_override_is_survivable() {
        let config = RuntimeConfig {
            convar_overrides: vec![format!("{MAX_FRAME_DT}=1e30")],
            ..RuntimeConfig::default()
        };
        let mut services = Services::new(&config);
        services.begin_frame();
        let time = services.begin_frame();
        assert!(time.dt.is_finite());
    }

    #[test]
    fn begin_frame_processes_queued_events() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut services = Services::new(&RuntimeConfig::default());
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        let _sub = services.events.subscribe(move |_: &u32| s.set(s.get() + 1));

        services.events.publish(7u32);
        assert_eq!(seen.get(), 0);
        services.begin_frame();
        assert_eq!(seen.get(), 1);
    }
}
