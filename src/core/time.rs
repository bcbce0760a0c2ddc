//! Frame timing and frame-rate limiting

use std::time::{Duration, Instant};

/// Smallest delta time handed to the simulation, in seconds
pub const MIN_DELTA_SECS: f32 = 1.0e-4;
/// Largest delta time handed to the simulation, in seconds (stalls, debugger breaks)
pub const MAX_DELTA_SECS: f32 = 0.25;

/// Tracks frame timing, calculates FPS and throttles to a target rate
pub struct FrameTimer {
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    fps_timer: Instant,
    fps: f32,
    fps_frame_count: u32,
}

impl FrameTimer {
    /// Create a new frame timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            fps_timer: now,
            fps: 0.0,
            fps_frame_count: 0,
        }
    }

    /// Call once per frame to update timing
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.frame_count += 1;
        self.fps_frame_count += 1;

        // Update FPS every second
        let fps_elapsed = now - self.fps_timer;
        if fps_elapsed >= Duration::from_secs(1) {
            self.fps = self.fps_frame_count as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = 0;
            self.fps_timer = now;
        }
    }

    /// Get delta time in seconds, clamped to a sane positive range
    pub fn delta_secs(&self) -> f32 {
        clamp_delta(self.delta.as_secs_f32())
    }

    /// Get current FPS (updated every second)
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Sleep for the rest of the frame interval if this frame finished early.
    /// `None` disables throttling.
    pub fn throttle(&self, target_fps: Option<u32>) {
        if let Some(remaining) = throttle_remaining(self.last_frame.elapsed(), target_fps) {
            std::thread::sleep(remaining);
        }
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp a raw frame delta into `[MIN_DELTA_SECS, MAX_DELTA_SECS]`
pub fn clamp_delta(secs: f32) -> f32 {
    if secs.is_nan() {
        return MIN_DELTA_SECS;
    }
    secs.clamp(MIN_DELTA_SECS, MAX_DELTA_SECS)
}

/// Time left in the target frame interval after `elapsed` of work
pub fn throttle_remaining(elapsed: Duration, target_fps: Option<u32>) -> Option<Duration> {
    let fps = target_fps.filter(|fps| *fps > 0)?;
    let interval = Duration::from_secs_f64(1.0 / fps as f64);
    interval.checked_sub(elapsed).filter(|d| !d.is_zero())
}
