//! # Backoff
//!
//! Fibonacci backoff for failing resources.
//!
//! The sequence grows quickly enough to shed load from a persistently broken
//! resource while the early retries stay cheap: 1m, 1m, 2m, 3m, 5m, 8m, 13m,
//! then capped. Each resource tracks its own backoff state independently.

use std::time::Duration;

/// Per-resource Fibonacci backoff state
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min_minutes: u64,
    max_minutes: u64,
    attempt: u32,
}

impl FibonacciBackoff {
    /// Create a backoff bounded to `[min_minutes, max_minutes]`
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            max_minutes,
            attempt: 0,
        }
    }

    /// Next backoff in seconds, advancing the sequence
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let minutes =
            fibonacci_minutes(self.attempt).clamp(self.min_minutes, self.max_minutes);
        self.attempt = self.attempt.saturating_add(1);
        minutes * 60
    }

    /// Reset after a successful reconcile
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Backoff duration for a given consecutive error count
    pub fn calculate_for_error_count(
        error_count: u32,
        min_minutes: u64,
        max_minutes: u64,
    ) -> Duration {
        let minutes = fibonacci_minutes(error_count).clamp(min_minutes, max_minutes);
        Duration::from_secs(minutes * 60)
    }
}

/// Fibonacci sequence in minutes, capped at one hour
fn fibonacci_minutes(attempt: u32) -> u64 {
    match attempt {
        0 | 1 => 1,
        2 => 2,
        3 => 3,
        4 => 5,
        5 => 8,
        6 => 13,
        7 => 21,
        8 => 34,
        9 => 55,
        _ => 60,
    }
}
