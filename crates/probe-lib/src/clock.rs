//! Interval timing
//!
//! All harness intervals are measured on the monotonic clock and reported
//! in seconds with microsecond resolution, so a wall-clock step can never
//! produce a negative interval.

use std::time::{Duration, Instant};

/// Truncate a duration to whole microseconds and express it in seconds
pub fn micros_to_secs(duration: Duration) -> f64 {
    duration.as_micros() as f64 / 1_000_000.0
}

/// A started interval timer
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Start timing now
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since start
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time since start in seconds, microsecond resolution
    pub fn elapsed_secs(&self) -> f64 {
        micros_to_secs(self.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_micros_to_secs() {
        assert_eq!(micros_to_secs(Duration::from_millis(1500)), 1.5);
        // Sub-microsecond remainder is dropped
        assert_eq!(micros_to_secs(Duration::from_nanos(2_999)), 0.000_002);
    }

    #[test]
    fn test_stopwatch_monotonic() {
        let watch = Stopwatch::start();
        let first = watch.elapsed_secs();
        std::thread::sleep(Duration::from_millis(2));
        let second = watch.elapsed_secs();
        assert!(first >= 0.0);
        assert!(second >= first);
        assert!(second >= 0.002);
    }
}
