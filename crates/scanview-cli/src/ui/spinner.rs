//! Spinner animation
//!
//! Frames are picked from wall-clock time, so the animation speed does
//! not depend on how often a line is redrawn.

use std::time::{Duration, Instant};

/// Time-based spinner
#[derive(Debug, Clone)]
pub struct Spinner {
    start_time: Instant,
    frames: &'static [&'static str],
    interval: Duration,
}

impl Spinner {
    /// Create a spinner that advances one frame per `interval`
    pub fn new(frames: &'static [&'static str], interval: Duration) -> Self {
        Self {
            start_time: Instant::now(),
            frames,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Glyph for the current moment
    pub fn current(&self) -> &'static str {
        if self.frames.is_empty() {
            return "";
        }
        self.frames[self.frame() % self.frames.len()]
    }

    /// Number of whole intervals elapsed since creation
    pub fn frame(&self) -> usize {
        let elapsed = self.start_time.elapsed().as_millis();
        (elapsed / self.interval.as_millis()) as usize
    }
}
