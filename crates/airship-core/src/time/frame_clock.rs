use std::time::{Duration, Instant};

/// Default upper bound on a single frame delta, in seconds.
pub const DEFAULT_MAX_DT: f32 = 0.1;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous tick, in seconds, after clamping.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Game loop clock producing `FrameTime` snapshots.
///
/// Delta time is clamped so a long stall (debugger, minimized window, slow
/// startup) does not turn into one huge simulation step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a clock clamping to `[0.0001s, DEFAULT_MAX_DT]`.
    pub fn new() -> Self {
        Self::with_clamps(
            Duration::from_micros(100),
            Duration::from_secs_f32(DEFAULT_MAX_DT),
        )
    }

    /// Creates a clock with custom delta-time clamps.
    ///
    /// Inverted bounds are swapped.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        let (dt_min, dt_max) = if dt_min <= dt_max {
            (dt_min, dt_max)
        } else {
            log::warn!("frame clock bounds inverted ({dt_min:?} > {dt_max:?}); swapping");
            (dt_max, dt_min)
        };
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Upper clamp in seconds.
    pub fn max_dt(&self) -> f32 {
        self.dt_max.as_secs_f32()
    }

    /// Adjusts the upper clamp. Values that are not a positive, representable
    /// duration are ignored and the previous clamp is kept.
    pub fn set_max_dt(&mut self, seconds: f32) {
        if seconds <= 0.0 {
            log::warn!("ignoring invalid max frame delta {seconds}");
            return;
        }
        match Duration::try_from_secs_f32(seconds) {
            Ok(max) => self.dt_max = max.max(self.dt_min),
            Err(e) => log::warn!("ignoring invalid max frame delta {seconds}: {e}"),
        }
    }

    /// Resets the clock baseline.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
