/// Elapsed-time sources for the frame loop
use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic seconds since the clock was started
pub trait Clock {
    fn elapsed_secs(&self) -> f32;
}

/// Wall clock backed by `Instant`
#[derive(Debug)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    /// Create a new clock, starting from now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    elapsed: Cell<f32>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(elapsed: f32) -> Self {
        Self {
            elapsed: Cell::new(elapsed),
        }
    }

    pub fn advance(&self, seconds: f32) {
        self.elapsed.set(self.elapsed.get() + seconds);
    }

    pub fn set(&self, elapsed: f32) {
        self.elapsed.set(elapsed);
    }
}

impl Clock for ManualClock {
    fn elapsed_secs(&self) -> f32 {
        self.elapsed.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn elapsed_secs(&self) -> f32 {
        (**self).elapsed_secs()
    }
}
