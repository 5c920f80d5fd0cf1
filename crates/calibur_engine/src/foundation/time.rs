//! Time management utilities

use std::time::Instant;

/// Time elapsed between two frames
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct TimeStep(f32);

impl TimeStep {
    /// Create a time step from seconds
    pub const fn from_seconds(seconds: f32) -> Self {
        Self(seconds)
    }

    /// Time step in seconds
    pub const fn seconds(self) -> f32 {
        self.0
    }

    /// Time step in milliseconds
    pub fn milliseconds(self) -> f32 {
        self.0 * 1000.0
    }
}

impl From<f32> for TimeStep {
    fn from(seconds: f32) -> Self {
        Self(seconds)
    }
}

/// High-precision timer for frame timing
pub struct FrameTimer {
    last_frame: Instant,
    total_time: f32,
    frame_count: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance to the next frame and return the time since the previous one
    pub fn tick(&mut self) -> TimeStep {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.total_time += delta;
        self.frame_count += 1;
        TimeStep(delta)
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
