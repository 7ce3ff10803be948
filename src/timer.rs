// Wall-clock source for the search deadline

use std::time::Instant;

/// Elapsed time since the current decision began
pub trait Clock {
    fn elapsed_ms(&self) -> u64;
}

/// Monotonic clock started at construction
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Stopwatch {
            start: Instant::now(),
        }
    }

    /// Clock measuring from an instant taken earlier (e.g. request arrival)
    pub fn since(start: Instant) -> Self {
        Stopwatch { start }
    }
}

impl Clock for Stopwatch {
    fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
