//! Frame clock.
//!
//! The animation core is driven purely by `dt`. [`FrameClock`] is where the
//! shell turns wall-clock time into that `dt`, clamped so a stalled frame
//! (window drag, debugger break) cannot teleport particles or skip whole
//! transition phases.
//!
//! ```ignore
//! let mut clock = FrameClock::new(0.1);
//!
//! // Once per frame:
//! let dt = clock.tick();
//! scene.tick(dt, force);
//! ```

use std::time::{Duration, Instant};

/// Converts wall-clock time into bounded per-frame deltas.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    /// Clamped delta of the last tick, in seconds.
    delta_secs: f32,
    /// Upper bound on `delta_secs`.
    max_delta: f32,
    /// Replaces the measured delta when set.
    fixed_delta: Option<f32>,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Start a clock that never reports a delta above `max_delta` seconds.
    pub fn new(max_delta: f32) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_secs: 0.0,
            max_delta: max_delta.max(0.0),
            fixed_delta: None,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Advance one frame and return its delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.delta_secs = self.clamp(self.fixed_delta.unwrap_or(raw_delta));
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_secs
    }

    fn clamp(&self, delta: f32) -> f32 {
        delta.clamp(0.0, self.max_delta)
    }

    /// Delta of the last tick, in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Largest delta this clock will report.
    #[inline]
    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    /// Frames ticked since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Measured frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Wall-clock time since the clock started.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Use a constant delta instead of measuring. Still subject to the clamp.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Forget the time spent since the last tick, so the next delta is
    /// measured from now.
    pub fn skip_stall(&mut self) {
        self.last_frame = Instant::now();
    }
}

/// Interval between frames for a target frame rate. Zero means uncapped.
pub fn frame_interval(frame_rate: u32) -> Duration {
    if frame_rate == 0 {
        Duration::ZERO
    } else {
        Duration::from_secs_f64(1.0 / f64::from(frame_rate))
    }
}
