//! Time measurement utilities
//!
//! A stopwatch for timing individual render stages and a cumulative moving
//! average for their per-frame execution statistics.

use std::time::{Duration, Instant};

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed += start.elapsed();
            self.start_time = None;
        }
    }

    /// Reset the stopwatch to zero
    pub fn reset(&mut self) {
        self.start_time = None;
        self.elapsed = Duration::ZERO;
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let current_elapsed = if let Some(start) = self.start_time {
            start.elapsed()
        } else {
            Duration::ZERO
        };
        self.elapsed + current_elapsed
    }

    /// Get the elapsed time in seconds
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_millis(&self) -> f32 {
        self.elapsed().as_secs_f32() * 1000.0
    }

    /// Check if the stopwatch is currently running
    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }
}

/// Cumulative moving average over an unbounded sample stream
///
/// Used for the per-stage average execution time of the render note chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovingAverage {
    mean: f32,
    samples: u64,
}

impl MovingAverage {
    /// Create an empty average
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a new sample into the average
    pub fn push(&mut self, sample: f32) {
        self.samples += 1;
        self.mean += (sample - self.mean) / self.samples as f32;
    }

    /// Get the current mean, or 0.0 before any sample
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Get the number of samples folded in so far
    pub fn samples(&self) -> u64 {
        self.samples
    }
}
