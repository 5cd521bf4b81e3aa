use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Sum of all clamped deltas so far, in seconds. Animation time.
    pub elapsed: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// One clock per window, so multi-window applications do not share delta-time state.
///
/// Delta time is clamped to avoid pathological values when the application is paused
/// by the debugger, minimized, or stalls. `elapsed` accumulates the clamped deltas, so
/// animations resume where they left off after a stall instead of jumping.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: f64,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock with default clamps (0.1ms to 250ms).
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            elapsed: 0.0,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the delta baseline; `elapsed` is kept.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;
        self.elapsed += dt.as_secs_f64();

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: self.elapsed as f32,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_accumulates_clamped_deltas() {
        let mut clock = FrameClock::new();
        let start = clock.last;

        let a = clock.tick_at(start + Duration::from_millis(16));
        assert_eq!(a.frame_index, 0);
        assert!((a.dt - 0.016).abs() < 1e-6);

        // A two-second stall counts as the 250ms maximum.
        let b = clock.tick_at(start + Duration::from_millis(2016));
        assert!((b.dt - 0.25).abs() < 1e-6);
        assert!((b.elapsed - 0.266).abs() < 1e-5);
        assert_eq!(b.frame_index, 1);
    }

    #[test]
    fn zero_delta_is_lifted_to_minimum() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        let t = clock.tick_at(start);
        assert!((t.dt - 0.0001).abs() < 1e-7);
    }
}
