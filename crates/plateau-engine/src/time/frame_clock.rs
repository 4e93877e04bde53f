use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Clamped time since the previous tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Number of ticks before this one.
    pub tick: u64,

    /// Smoothed frames per second.
    pub fps: f32,
}

/// Produces `FrameTime` snapshots for one render loop.
///
/// Delta time is clamped so a stall (debugger, minimized window) does not
/// show up as one huge step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    tick: u64,
    dt_min: Duration,
    dt_max: Duration,
    fps: f32,
}

/// Weight of the newest sample in the fps average.
const FPS_SMOOTHING: f32 = 0.1;

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            tick: 0,
            dt_min,
            dt_max,
            fps: 0.0,
        }
    }

    /// Resets the baseline, e.g. after the window was restored.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max)
            .as_secs_f32();
        self.last = now;

        let instant_fps = 1.0 / dt;
        self.fps = if self.tick == 0 {
            instant_fps
        } else {
            self.fps + (instant_fps - self.fps) * FPS_SMOOTHING
        };

        let ft = FrameTime {
            dt,
            now,
            tick: self.tick,
            fps: self.fps,
        };
        self.tick = self.tick.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_is_clamped() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(1), Duration::from_millis(50));
        let start = clock.last;

        let ft = clock.tick_at(start);
        assert!((ft.dt - 0.001).abs() < 1e-6);

        let ft = clock.tick_at(start + Duration::from_secs(3));
        assert!((ft.dt - 0.05).abs() < 1e-6);
    }

    #[test]
    fn ticks_count_up_and_fps_converges() {
        let mut clock = FrameClock::new();
        let mut now = clock.last;
        let mut last = None;
        for i in 0..200 {
            now += Duration::from_millis(10);
            let ft = clock.tick_at(now);
            assert_eq!(ft.tick, i);
            last = Some(ft);
        }
        let fps = last.map(|ft| ft.fps).unwrap_or_default();
        assert!((fps - 100.0).abs() < 1.0, "fps {fps}");
    }
}
